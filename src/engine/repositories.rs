// ==========================================
// 课程评教系统 - 引擎层仓储聚合
// ==========================================
// 职责: 聚合评教引擎所需的所有 Repository
// 目标: 共享同一连接，简化引擎构造
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::repository::{
    CriteriaRepository, EvaluationRepository, OfferingRepository, PeriodRepository,
};

/// 评教引擎仓储集合
///
/// # 包含的仓储
/// - `criteria_repo`: 评教指标
/// - `period_repo`: 评教周期
/// - `offering_repo`: 开课与学生
/// - `evaluation_repo`: 评教记录
#[derive(Clone)]
pub struct EvaluationRepositories {
    pub criteria_repo: Arc<CriteriaRepository>,
    pub period_repo: Arc<PeriodRepository>,
    pub offering_repo: Arc<OfferingRepository>,
    pub evaluation_repo: Arc<EvaluationRepository>,
}

impl EvaluationRepositories {
    /// 基于同一连接创建全部仓储
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            criteria_repo: Arc::new(CriteriaRepository::from_connection(conn.clone())),
            period_repo: Arc::new(PeriodRepository::from_connection(conn.clone())),
            offering_repo: Arc::new(OfferingRepository::from_connection(conn.clone())),
            evaluation_repo: Arc::new(EvaluationRepository::from_connection(conn)),
        }
    }
}
