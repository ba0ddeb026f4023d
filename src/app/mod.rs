// ==========================================
// 课程评教系统 - 应用层
// ==========================================
// 职责: 组合根，连接展示层与后端
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
