// ==========================================
// 课程评教系统 - 领域类型定义
// ==========================================
// 红线: 状态与等级一律使用封闭枚举，禁止字符串分派
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 评教周期状态 (Period Status)
// ==========================================
// 顺序: NotStarted < Active < Closed（单调推进，不可回退）
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodStatus {
    NotStarted, // 未开始
    Active,     // 进行中
    Closed,     // 已结束
}

impl fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl PeriodStatus {
    /// 从数据库字符串解析状态
    ///
    /// 未知值返回 None，由调用方决定如何处理
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "NOT_STARTED" => Some(PeriodStatus::NotStarted),
            "ACTIVE" => Some(PeriodStatus::Active),
            "CLOSED" => Some(PeriodStatus::Closed),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            PeriodStatus::NotStarted => "NOT_STARTED",
            PeriodStatus::Active => "ACTIVE",
            PeriodStatus::Closed => "CLOSED",
        }
    }

    /// 是否允许从当前状态迁移到目标状态
    ///
    /// 同状态视为允许（幂等），逆序一律拒绝
    pub fn can_transition_to(&self, target: PeriodStatus) -> bool {
        target >= *self
    }
}

// ==========================================
// 评教等级 (Grade)
// ==========================================
// 顺序: Poor < Fair < Good < Excellent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Grade {
    Poor,      // 较差 (< 70)
    Fair,      // 中等 (70 ~ 80)
    Good,      // 良好 (80 ~ 90)
    Excellent, // 优秀 (>= 90)
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl Grade {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "EXCELLENT" => Some(Grade::Excellent),
            "GOOD" => Some(Grade::Good),
            "FAIR" => Some(Grade::Fair),
            "POOR" => Some(Grade::Poor),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            Grade::Excellent => "EXCELLENT",
            Grade::Good => "GOOD",
            Grade::Fair => "FAIR",
            Grade::Poor => "POOR",
        }
    }

    /// 中文等级名称（用于界面展示）
    pub fn label(&self) -> &'static str {
        match self {
            Grade::Excellent => "优秀",
            Grade::Good => "良好",
            Grade::Fair => "中等",
            Grade::Poor => "较差",
        }
    }
}

// ==========================================
// 提交资格原因 (Eligibility Reason)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EligibilityReason {
    Ok,               // 允许提交
    NoActivePeriod,   // 无进行中的评教周期（或周期不匹配）
    AlreadySubmitted, // 已提交过
    OfferingNotFound, // 开课不存在或不属于该学生班级
    OutsideWindow,    // 不在评教时间窗口内
}

impl fmt::Display for EligibilityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EligibilityReason::Ok => write!(f, "OK"),
            EligibilityReason::NoActivePeriod => write!(f, "NO_ACTIVE_PERIOD"),
            EligibilityReason::AlreadySubmitted => write!(f, "ALREADY_SUBMITTED"),
            EligibilityReason::OfferingNotFound => write!(f, "OFFERING_NOT_FOUND"),
            EligibilityReason::OutsideWindow => write!(f, "OUTSIDE_WINDOW"),
        }
    }
}
