// ==========================================
// 课程评教系统 - API层错误类型
// ==========================================
// 职责: 汇总各层错误，转换为展示层可用的错误码与本地化消息
// ==========================================

use crate::engine::error::{PeriodError, ScoreViolation, SubmitError};
use crate::i18n::t_with_args;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 提交被拒绝（均可恢复）
    // ==========================================
    #[error("当前没有进行中的评教周期")]
    NoActivePeriod,

    #[error("该课程本周期已评教，不能重复提交")]
    AlreadySubmitted,

    #[error("开课不存在或不属于该学生所在班级")]
    OfferingNotFound,

    #[error("不在评教时间窗口内")]
    OutsideWindow,

    #[error("评分无效: {0}")]
    InvalidScore(ScoreViolation),

    #[error("评语过长: 最多 {max_chars} 字，实际 {actual_chars} 字")]
    InvalidComment {
        max_chars: usize,
        actual_chars: usize,
    },

    #[error("评教指标不可用: {0}")]
    CriteriaUnavailable(String),

    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    #[error("无效的状态转换: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("评教记录写入失败: {0}")]
    PersistenceFailure(String),

    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 导入错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
        }
    }
}

impl From<SubmitError> for ApiError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::NoActivePeriod => ApiError::NoActivePeriod,
            SubmitError::AlreadySubmitted => ApiError::AlreadySubmitted,
            SubmitError::OfferingNotFound => ApiError::OfferingNotFound,
            SubmitError::OutsideWindow => ApiError::OutsideWindow,
            SubmitError::InvalidScore(violation) => ApiError::InvalidScore(violation),
            SubmitError::InvalidComment {
                max_chars,
                actual_chars,
            } => ApiError::InvalidComment {
                max_chars,
                actual_chars,
            },
            SubmitError::CriteriaUnavailable(msg) => ApiError::CriteriaUnavailable(msg),
            SubmitError::PersistenceFailure(msg) => ApiError::PersistenceFailure(msg),
        }
    }
}

impl From<PeriodError> for ApiError {
    fn from(err: PeriodError) -> Self {
        match err {
            PeriodError::NotFound(id) => {
                ApiError::NotFound(format!("评教周期(id={})不存在", id))
            }
            err @ PeriodError::InvalidWindow { .. } => ApiError::InvalidInput(err.to_string()),
            PeriodError::InvalidStateTransition { from, to } => {
                ApiError::InvalidStateTransition { from, to }
            }
            PeriodError::Repository(err) => err.into(),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Repository(err) => err.into(),
            err => ApiError::ImportError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// ErrorResponse - 返回给展示层的错误结构
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 错误代码
    pub code: String,

    /// 错误消息（按当前语言本地化）
    pub message: String,

    /// 详细信息（可选）
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// 稳定的错误代码（展示层据此分支）
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NoActivePeriod => "NO_ACTIVE_PERIOD",
            ApiError::AlreadySubmitted => "ALREADY_SUBMITTED",
            ApiError::OfferingNotFound => "OFFERING_NOT_FOUND",
            ApiError::OutsideWindow => "OUTSIDE_WINDOW",
            ApiError::InvalidScore(_) => "INVALID_SCORE",
            ApiError::InvalidComment { .. } => "INVALID_COMMENT",
            ApiError::CriteriaUnavailable(_) => "CRITERIA_UNAVAILABLE",
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::BusinessRuleViolation(_) => "BUSINESS_RULE_VIOLATION",
            ApiError::InvalidStateTransition { .. } => "INVALID_STATE_TRANSITION",
            ApiError::PersistenceFailure(_) => "PERSISTENCE_FAILURE",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::DatabaseConnectionError(_) => "DATABASE_CONNECTION_ERROR",
            ApiError::ImportError(_) => "IMPORT_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// 附加在本地化模板中的细节文本
    fn detail_text(&self) -> String {
        match self {
            ApiError::InvalidScore(violation) => violation.to_string(),
            ApiError::CriteriaUnavailable(msg)
            | ApiError::InvalidInput(msg)
            | ApiError::NotFound(msg)
            | ApiError::BusinessRuleViolation(msg)
            | ApiError::PersistenceFailure(msg)
            | ApiError::DatabaseError(msg)
            | ApiError::DatabaseConnectionError(msg)
            | ApiError::ImportError(msg)
            | ApiError::InternalError(msg) => msg.clone(),
            _ => String::new(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::InvalidScore(ScoreViolation::OutOfRange {
                criterion_id,
                score,
                max_score,
            }) => Some(serde_json::json!({
                "criterion_id": criterion_id,
                "score": score,
                "max_score": max_score,
            })),
            ApiError::InvalidScore(
                ScoreViolation::UnknownCriterion { criterion_id }
                | ScoreViolation::Missing { criterion_id },
            ) => Some(serde_json::json!({ "criterion_id": criterion_id })),
            ApiError::InvalidComment {
                max_chars,
                actual_chars,
            } => Some(serde_json::json!({
                "max_chars": max_chars,
                "actual_chars": actual_chars,
            })),
            ApiError::InvalidStateTransition { from, to } => {
                Some(serde_json::json!({ "from": from, "to": to }))
            }
            _ => None,
        }
    }

    /// 转换为展示层错误结构（消息使用当前语言）
    pub fn to_response(&self) -> ErrorResponse {
        let code = self.code();
        let detail = self.detail_text();
        let (max_chars, actual_chars, from, to) = match self {
            ApiError::InvalidComment {
                max_chars,
                actual_chars,
            } => (max_chars.to_string(), actual_chars.to_string(), String::new(), String::new()),
            ApiError::InvalidStateTransition { from, to } => {
                (String::new(), String::new(), from.clone(), to.clone())
            }
            _ => Default::default(),
        };

        ErrorResponse {
            code: code.to_string(),
            message: t_with_args(
                &format!("errors.{}", code),
                &[
                    ("detail", detail.as_str()),
                    ("max_chars", max_chars.as_str()),
                    ("actual_chars", actual_chars.as_str()),
                    ("from", from.as_str()),
                    ("to", to.as_str()),
                ],
            ),
            details: self.details(),
        }
    }
}

/// 将 ApiError 转换为 JSON 字符串（展示层协议）
pub fn map_api_error(err: ApiError) -> String {
    let response = err.to_response();
    serde_json::to_string(&response).unwrap_or_else(|_| err.to_string())
}
