// ==========================================
// 课程评教系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod criteria_repo;
pub mod error;
pub mod evaluation_repo;
pub mod offering_repo;
pub mod period_repo;
pub mod ports;

// 重导出核心仓储
pub use criteria_repo::CriteriaRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use evaluation_repo::EvaluationRepository;
pub use offering_repo::OfferingRepository;
pub use period_repo::PeriodRepository;
pub use ports::{CriteriaReader, EvaluationStore, OfferingReader, PeriodStore, StudentDirectory};
