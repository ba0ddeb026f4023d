// ==========================================
// 课程评教系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约定: 全部错误均可恢复，由展示层提示用户重试或放弃
// ==========================================

use crate::domain::types::EligibilityReason;
use crate::repository::error::RepositoryError;
use thiserror::Error;

// ==========================================
// ScoreViolation - 得分/指标校验违规
// ==========================================
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoreViolation {
    #[error("未知的评教指标: {criterion_id}")]
    UnknownCriterion { criterion_id: String },

    #[error("指标 {criterion_id} 得分 {score} 超出范围 [0, {max_score}]")]
    OutOfRange {
        criterion_id: String,
        score: i32,
        max_score: i32,
    },

    #[error("指标 {criterion_id} 未评分")]
    Missing { criterion_id: String },

    #[error("指标权重之和应为 100，实际为 {actual}")]
    WeightSumMismatch { actual: f64 },
}

// ==========================================
// SubmitError - 评教提交错误
// ==========================================
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("当前没有进行中的评教周期")]
    NoActivePeriod,

    #[error("该课程本周期已评教，不能重复提交")]
    AlreadySubmitted,

    #[error("开课不存在或不属于该学生所在班级")]
    OfferingNotFound,

    #[error("不在评教时间窗口内")]
    OutsideWindow,

    #[error("评分无效: {0}")]
    InvalidScore(#[from] ScoreViolation),

    #[error("评语过长: 最多 {max_chars} 字，实际 {actual_chars} 字")]
    InvalidComment {
        max_chars: usize,
        actual_chars: usize,
    },

    #[error("评教指标不可用: {0}")]
    CriteriaUnavailable(String),

    #[error("持久化失败: {0}")]
    PersistenceFailure(String),
}

impl SubmitError {
    /// 将资格判定原因映射为提交错误（OK 返回 None）
    pub fn from_reason(reason: EligibilityReason) -> Option<Self> {
        match reason {
            EligibilityReason::Ok => None,
            EligibilityReason::NoActivePeriod => Some(SubmitError::NoActivePeriod),
            EligibilityReason::AlreadySubmitted => Some(SubmitError::AlreadySubmitted),
            EligibilityReason::OfferingNotFound => Some(SubmitError::OfferingNotFound),
            EligibilityReason::OutsideWindow => Some(SubmitError::OutsideWindow),
        }
    }
}

impl From<RepositoryError> for SubmitError {
    fn from(err: RepositoryError) -> Self {
        // 存储层唯一索引拒绝 = 并发下的重复提交
        if err.is_unique_violation() {
            SubmitError::AlreadySubmitted
        } else {
            SubmitError::PersistenceFailure(err.to_string())
        }
    }
}

// ==========================================
// PeriodError - 评教周期管理错误
// ==========================================
#[derive(Error, Debug)]
pub enum PeriodError {
    #[error("评教周期不存在: {0}")]
    NotFound(String),

    #[error("评教周期时间窗口非法: start={start} end={end}")]
    InvalidWindow { start: String, end: String },

    #[error("无效的状态转换: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
