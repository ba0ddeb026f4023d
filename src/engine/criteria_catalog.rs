// ==========================================
// 课程评教系统 - 评教指标目录
// ==========================================
// 职责: 解析本次评分使用的指标集合
// 规则: 指标库为空且允许回退时使用默认五项指标
// ==========================================

use crate::config::EvaluationConfigReader;
use crate::domain::criteria::{default_criteria, EvaluationCriteria};
use crate::engine::error::SubmitError;
use crate::repository::error::RepositoryResult;
use crate::repository::ports::CriteriaReader;
use std::sync::Arc;
use tracing::warn;

pub struct CriteriaCatalog {
    reader: Arc<dyn CriteriaReader>,
    config: Arc<dyn EvaluationConfigReader>,
}

impl CriteriaCatalog {
    pub fn new(reader: Arc<dyn CriteriaReader>, config: Arc<dyn EvaluationConfigReader>) -> Self {
        Self { reader, config }
    }

    /// 库中启用的指标（不做回退）
    pub fn list_criteria(&self) -> RepositoryResult<Vec<EvaluationCriteria>> {
        self.reader.list_active_criteria()
    }

    /// 解析评分所用指标
    ///
    /// # 返回
    /// - Ok(Vec): 库中指标；库为空且允许回退时为默认指标
    /// - Err(CriteriaUnavailable): 读取失败，或库为空且禁用回退
    pub async fn resolve_criteria(&self) -> Result<Vec<EvaluationCriteria>, SubmitError> {
        let criteria = self
            .reader
            .list_active_criteria()
            .map_err(|e| SubmitError::CriteriaUnavailable(e.to_string()))?;
        if !criteria.is_empty() {
            return Ok(criteria);
        }

        let fallback_enabled = self
            .config
            .get_criteria_fallback_enabled()
            .await
            .map_err(|e| SubmitError::CriteriaUnavailable(e.to_string()))?;
        if !fallback_enabled {
            return Err(SubmitError::CriteriaUnavailable(
                "指标库为空且未启用默认指标".to_string(),
            ));
        }

        warn!("指标库为空，使用默认评教指标");
        Ok(default_criteria())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{config_keys, ConfigManager};
    use crate::db::init_schema;
    use crate::repository::error::RepositoryError;
    use crate::repository::CriteriaRepository;
    use rusqlite::Connection;
    use std::sync::Mutex;

    struct BrokenReader;

    impl CriteriaReader for BrokenReader {
        fn list_active_criteria(&self) -> RepositoryResult<Vec<EvaluationCriteria>> {
            Err(RepositoryError::DatabaseQueryError("no such table".to_string()))
        }
    }

    fn setup() -> (Arc<CriteriaRepository>, Arc<ConfigManager>) {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));
        (
            Arc::new(CriteriaRepository::from_connection(conn.clone())),
            Arc::new(ConfigManager::from_connection(conn).unwrap()),
        )
    }

    #[tokio::test]
    async fn test_stored_criteria_take_precedence() {
        let (repo, config) = setup();
        let custom = vec![
            EvaluationCriteria::new("K1", "课堂", "", 60.0, 10),
            EvaluationCriteria::new("K2", "作业", "", 40.0, 10),
        ];
        repo.replace_catalog(&custom).unwrap();

        let catalog = CriteriaCatalog::new(repo, config);
        assert_eq!(catalog.resolve_criteria().await.unwrap(), custom);
    }

    #[tokio::test]
    async fn test_empty_catalog_falls_back_to_defaults() {
        let (repo, config) = setup();
        let catalog = CriteriaCatalog::new(repo, config);
        assert!(catalog.list_criteria().unwrap().is_empty());
        assert_eq!(catalog.resolve_criteria().await.unwrap(), default_criteria());
    }

    #[tokio::test]
    async fn test_fallback_disabled() {
        let (repo, config) = setup();
        config
            .set_global_config_value(config_keys::CRITERIA_FALLBACK_ENABLED, "false")
            .unwrap();
        let catalog = CriteriaCatalog::new(repo, config);
        assert!(matches!(
            catalog.resolve_criteria().await,
            Err(SubmitError::CriteriaUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_storage_failure_is_criteria_unavailable() {
        let (_, config) = setup();
        let catalog = CriteriaCatalog::new(Arc::new(BrokenReader), config);
        assert!(matches!(
            catalog.resolve_criteria().await,
            Err(SubmitError::CriteriaUnavailable(_))
        ));
    }
}
