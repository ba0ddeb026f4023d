// ==========================================
// 课程评教系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("文件不包含任何指标")]
    EmptyFile,

    // ===== 数据质量错误 =====
    #[error("指标ID缺失 (行 {0})")]
    PrimaryKeyMissing(usize),

    #[error("字段为空 (行 {row}, 字段 {field})")]
    EmptyField { row: usize, field: String },

    #[error("数值范围错误 (行 {row}, 字段 {field}): 值 {value} 超出范围 [{min}, {max}]")]
    ValueRangeError {
        row: usize,
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("指标ID重复: {0:?}")]
    DuplicateCriterion(Vec<String>),

    #[error("指标权重之和应为 100，实际为 {actual}")]
    WeightSumMismatch { actual: f64 },

    // ===== 数据库错误 =====
    #[error("指标写入失败: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
