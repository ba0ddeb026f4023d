// ==========================================
// 课程评教系统 - 评教配置读取 Trait
// ==========================================
// 职责: 定义评教引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

/// 配置读取错误类型
pub type ConfigError = Box<dyn Error + Send + Sync>;

// ==========================================
// EvaluationConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait EvaluationConfigReader: Send + Sync {
    /// 指标库为空时是否启用默认五项指标
    ///
    /// # 默认值
    /// - true
    async fn get_criteria_fallback_enabled(&self) -> Result<bool, ConfigError>;

    /// 是否要求每项指标都必须打分
    ///
    /// # 默认值
    /// - false（缺项按 0 分计入）
    async fn get_require_complete_scores(&self) -> Result<bool, ConfigError>;

    /// 评语最大字符数
    ///
    /// # 默认值
    /// - 500
    async fn get_max_comment_chars(&self) -> Result<usize, ConfigError>;
}
