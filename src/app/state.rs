// ==========================================
// 课程评教系统 - 应用状态
// ==========================================
// 职责: 组装仓储、引擎与 API，持有共享数据库连接
// 约定: 每个客户端一个 AppState（一个连接）；多个 AppState 可指向同一数据库文件
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::{AdminApi, EvaluationApi};
use crate::config::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::engine::{
    CriteriaCatalog, EligibilityChecker, EvaluationRepositories, EvaluationSubmitter,
    PeriodManager,
};
use crate::importer::CriteriaCsvImporter;

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 共享连接
    pub conn: Arc<Mutex<Connection>>,

    /// 仓储集合
    pub repos: EvaluationRepositories,

    /// 配置管理器
    pub config: Arc<ConfigManager>,

    /// 周期管理器
    pub period_manager: Arc<PeriodManager>,

    /// 提交器（引擎层直接入口，测试可注入时钟）
    pub submitter: Arc<EvaluationSubmitter>,

    /// 学生端API
    pub evaluation_api: Arc<EvaluationApi>,

    /// 管理端API
    pub admin_api: Arc<AdminApi>,
}

impl AppState {
    /// 打开数据库并组装全部组件
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（不存在时自动创建并建表）
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库初始化失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let repos = EvaluationRepositories::from_connection(conn.clone());
        let config = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 初始化Engine层
        // ==========================================
        let period_manager = Arc::new(PeriodManager::new(repos.period_repo.clone()));
        let eligibility = Arc::new(EligibilityChecker::new(
            period_manager.clone(),
            repos.offering_repo.clone(),
            repos.offering_repo.clone(),
            repos.evaluation_repo.clone(),
        ));
        let catalog = Arc::new(CriteriaCatalog::new(
            repos.criteria_repo.clone(),
            config.clone(),
        ));
        let submitter = Arc::new(EvaluationSubmitter::new(
            eligibility.clone(),
            catalog.clone(),
            config.clone(),
            repos.evaluation_repo.clone(),
        ));
        let importer = Arc::new(CriteriaCsvImporter::new(repos.criteria_repo.clone()));

        // ==========================================
        // 初始化API层
        // ==========================================
        let evaluation_api = Arc::new(EvaluationApi::new(
            period_manager.clone(),
            eligibility,
            catalog,
            submitter.clone(),
            repos.evaluation_repo.clone(),
        ));
        let admin_api = Arc::new(AdminApi::new(
            repos.clone(),
            period_manager.clone(),
            importer,
            config.clone(),
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            conn,
            repos,
            config,
            period_manager,
            submitter,
            evaluation_api,
            admin_api,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先读取环境变量 COURSE_EVAL_DB_PATH，其次使用用户数据目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("COURSE_EVAL_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./course_evaluation.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("course-evaluation");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("course_evaluation.db");
        }
    }

    path.to_string_lossy().to_string()
}
