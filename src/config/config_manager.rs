// ==========================================
// 课程评教系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::evaluation_config_trait::{ConfigError, EvaluationConfigReader};
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    pub const CRITERIA_FALLBACK_ENABLED: &str = "evaluation/criteria_fallback_enabled";
    pub const REQUIRE_COMPLETE_SCORES: &str = "evaluation/require_complete_scores";
    pub const MAX_COMMENT_CHARS: &str = "evaluation/max_comment_chars";
}

/// 默认评语长度上限
pub const DEFAULT_MAX_COMMENT_CHARS: usize = 500;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, ConfigError> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（管理端使用）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), ConfigError> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(key, value, "配置已更新");
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> Result<String, ConfigError> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key"
        )?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    fn get_bool(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        Ok(match self.get_config_value(key)? {
            Some(raw) => parse_bool(&raw).unwrap_or_else(|| {
                tracing::warn!(key, raw = %raw, "配置值不是布尔值，使用默认值");
                default
            }),
            None => default,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[async_trait]
impl EvaluationConfigReader for ConfigManager {
    async fn get_criteria_fallback_enabled(&self) -> Result<bool, ConfigError> {
        self.get_bool(config_keys::CRITERIA_FALLBACK_ENABLED, true)
    }

    async fn get_require_complete_scores(&self) -> Result<bool, ConfigError> {
        self.get_bool(config_keys::REQUIRE_COMPLETE_SCORES, false)
    }

    async fn get_max_comment_chars(&self) -> Result<usize, ConfigError> {
        let value = match self.get_config_value(config_keys::MAX_COMMENT_CHARS)? {
            Some(raw) => raw.trim().parse::<usize>().unwrap_or_else(|_| {
                tracing::warn!(raw = %raw, "max_comment_chars 配置非法，使用默认值");
                DEFAULT_MAX_COMMENT_CHARS
            }),
            None => DEFAULT_MAX_COMMENT_CHARS,
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn setup_manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[tokio::test]
    async fn test_defaults_when_missing() {
        let config = setup_manager();
        assert!(config.get_criteria_fallback_enabled().await.unwrap());
        assert!(!config.get_require_complete_scores().await.unwrap());
        assert_eq!(config.get_max_comment_chars().await.unwrap(), DEFAULT_MAX_COMMENT_CHARS);
    }

    #[tokio::test]
    async fn test_overrides_are_read() {
        let config = setup_manager();
        config
            .set_global_config_value(config_keys::CRITERIA_FALLBACK_ENABLED, "false")
            .unwrap();
        config
            .set_global_config_value(config_keys::MAX_COMMENT_CHARS, "120")
            .unwrap();

        assert!(!config.get_criteria_fallback_enabled().await.unwrap());
        assert_eq!(config.get_max_comment_chars().await.unwrap(), 120);
    }

    #[tokio::test]
    async fn test_invalid_values_fall_back_to_default() {
        let config = setup_manager();
        config
            .set_global_config_value(config_keys::REQUIRE_COMPLETE_SCORES, "maybe")
            .unwrap();
        config
            .set_global_config_value(config_keys::MAX_COMMENT_CHARS, "-3")
            .unwrap();

        assert!(!config.get_require_complete_scores().await.unwrap());
        assert_eq!(config.get_max_comment_chars().await.unwrap(), DEFAULT_MAX_COMMENT_CHARS);
    }

    #[test]
    fn test_snapshot_contains_keys() {
        let config = setup_manager();
        config
            .set_global_config_value(config_keys::REQUIRE_COMPLETE_SCORES, "true")
            .unwrap();

        let snapshot: BTreeMap<String, String> =
            serde_json::from_str(&config.get_config_snapshot().unwrap()).unwrap();
        assert_eq!(
            snapshot.get(config_keys::REQUIRE_COMPLETE_SCORES).map(String::as_str),
            Some("true")
        );
    }
}
