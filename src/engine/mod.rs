// ==========================================
// 课程评教系统 - 引擎层
// ==========================================
// 职责: 实现评教业务规则，不拼 SQL
// 红线: Engine 不拼 SQL，所有拒绝必须给出原因
// ==========================================

pub mod criteria_catalog;
pub mod eligibility;
pub mod error;
pub mod period_manager;
pub mod repositories;
pub mod scoring;
pub mod submitter;

// 重导出核心引擎
pub use criteria_catalog::CriteriaCatalog;
pub use eligibility::EligibilityChecker;
pub use error::{PeriodError, ScoreViolation, SubmitError};
pub use period_manager::PeriodManager;
pub use repositories::EvaluationRepositories;
pub use scoring::ScoringEngine;
pub use submitter::EvaluationSubmitter;
