// ==========================================
// 课程评教系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod criteria;
pub mod evaluation;
pub mod offering;
pub mod period;
pub mod types;

// 重导出核心类型
pub use criteria::{default_criteria, EvaluationCriteria};
pub use evaluation::{
    EligibilityDecision, Evaluation, EvaluationId, OfferingSummary, SubmitRequest,
};
pub use offering::{CourseOffering, Student};
pub use period::EvaluationPeriod;
pub use types::{EligibilityReason, Grade, PeriodStatus};
