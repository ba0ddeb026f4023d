// ==========================================
// 课程评教系统 - API层
// ==========================================
// 职责: 为展示层提供业务接口，统一错误类型
// ==========================================

pub mod admin_api;
pub mod error;
pub mod evaluation_api;

pub use admin_api::AdminApi;
pub use error::{map_api_error, ApiError, ApiResult, ErrorResponse};
pub use evaluation_api::EvaluationApi;
