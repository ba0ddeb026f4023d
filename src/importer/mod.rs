// ==========================================
// 课程评教系统 - 导入层
// ==========================================
// 职责: 外部数据导入（评教指标 CSV）
// ==========================================

pub mod criteria_importer;
pub mod error;

// 重导出核心类型
pub use criteria_importer::CriteriaCsvImporter;
pub use error::{ImportError, ImportResult};
