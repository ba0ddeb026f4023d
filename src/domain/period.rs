// ==========================================
// 课程评教系统 - 评教周期领域模型
// ==========================================
// 对齐: evaluation_period 表
// 红线: 状态单调推进 NOT_STARTED → ACTIVE → CLOSED，已结束周期不可重开
// ==========================================

use crate::domain::types::PeriodStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// EvaluationPeriod - 评教周期
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationPeriod {
    pub period_id: String, // 周期ID (唯一)
    pub name: String,      // 周期名称
    pub semester: String,  // 学期标识 (如 2025-2026-1)

    // ===== 时间窗口 (闭区间) =====
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    pub status: PeriodStatus, // 周期状态 (存储为字符串)
}

impl EvaluationPeriod {
    /// 创建新的评教周期（初始状态 NOT_STARTED）
    pub fn new(
        period_id: impl Into<String>,
        name: impl Into<String>,
        semester: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            period_id: period_id.into(),
            name: name.into(),
            semester: semester.into(),
            start_date,
            end_date,
            status: PeriodStatus::NotStarted,
        }
    }

    /// 时间窗口是否合法 (end_date >= start_date)
    pub fn has_valid_window(&self) -> bool {
        self.end_date >= self.start_date
    }

    pub fn is_closed(&self) -> bool {
        self.status == PeriodStatus::Closed
    }
}
