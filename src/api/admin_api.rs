// ==========================================
// 课程评教系统 - 管理 API（管理员端）
// ==========================================
// 职责: 周期管理、指标导入、配置维护、基础数据同步、评教汇总
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::{CourseOffering, EvaluationCriteria, EvaluationPeriod, OfferingSummary, Student};
use crate::engine::{EvaluationRepositories, PeriodManager};
use crate::importer::CriteriaCsvImporter;
use crate::repository::ports::EvaluationStore;
use chrono::{Local, NaiveDate};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

// ==========================================
// AdminApi - 管理API
// ==========================================
pub struct AdminApi {
    repos: EvaluationRepositories,
    period_manager: Arc<PeriodManager>,
    importer: Arc<CriteriaCsvImporter>,
    config: Arc<ConfigManager>,
}

impl AdminApi {
    pub fn new(
        repos: EvaluationRepositories,
        period_manager: Arc<PeriodManager>,
        importer: Arc<CriteriaCsvImporter>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            repos,
            period_manager,
            importer,
            config,
        }
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    // ==========================================
    // 评教周期
    // ==========================================

    pub fn list_periods(&self) -> ApiResult<Vec<EvaluationPeriod>> {
        Ok(self.period_manager.list_periods(Self::today())?)
    }

    /// 创建评教周期
    ///
    /// # 参数
    /// - start_date / end_date: YYYY-MM-DD，闭区间
    pub fn create_period(
        &self,
        period_id: &str,
        name: &str,
        semester: &str,
        start_date: &str,
        end_date: &str,
    ) -> ApiResult<EvaluationPeriod> {
        if period_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("周期ID不能为空".to_string()));
        }
        let start = parse_date(start_date)?;
        let end = parse_date(end_date)?;
        Ok(self
            .period_manager
            .create_period(period_id, name, semester, start, end, Self::today())?)
    }

    /// 提前关闭评教周期（不可逆）
    ///
    /// # 返回
    /// - Ok(true): 已关闭；Ok(false): 此前已关闭
    pub fn close_period(&self, period_id: &str) -> ApiResult<bool> {
        Ok(self.period_manager.close_period(period_id)?)
    }

    /// 按当前日期推进全部周期状态
    pub fn reconcile_periods(&self) -> ApiResult<usize> {
        Ok(self.period_manager.reconcile_all(Self::today())?)
    }

    // ==========================================
    // 评教指标
    // ==========================================

    /// 从 CSV 文件替换指标库
    pub fn import_criteria_csv(&self, path: &str) -> ApiResult<usize> {
        Ok(self.importer.import_from_path(Path::new(path))?)
    }

    /// 全部指标（含已停用），附启用标记
    pub fn list_all_criteria(&self) -> ApiResult<Vec<(EvaluationCriteria, bool)>> {
        Ok(self.repos.criteria_repo.list_all()?)
    }

    // ==========================================
    // 基础数据同步
    // ==========================================

    pub fn sync_offerings(&self, offerings: &[CourseOffering]) -> ApiResult<usize> {
        for offering in offerings {
            self.repos.offering_repo.upsert_offering(offering)?;
        }
        info!(count = offerings.len(), "开课数据已同步");
        Ok(offerings.len())
    }

    pub fn sync_students(&self, students: &[Student]) -> ApiResult<usize> {
        for student in students {
            self.repos.offering_repo.upsert_student(student)?;
        }
        info!(count = students.len(), "学生数据已同步");
        Ok(students.len())
    }

    // ==========================================
    // 汇总与配置
    // ==========================================

    pub fn summarize_offering(&self, offering_id: &str, period_id: &str) -> ApiResult<OfferingSummary> {
        Ok(self
            .repos
            .evaluation_repo
            .summarize_offering(offering_id, period_id)?)
    }

    pub fn get_config_snapshot(&self) -> ApiResult<String> {
        self.config
            .get_config_snapshot()
            .map_err(|e| ApiError::InternalError(e.to_string()))
    }

    pub fn set_config_value(&self, key: &str, value: &str) -> ApiResult<()> {
        self.config
            .set_global_config_value(key, value)
            .map_err(|e| ApiError::DatabaseError(e.to_string()))
    }
}

/// 解析日期字符串
fn parse_date(date_str: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
        .map_err(|e| ApiError::InvalidInput(format!("日期格式错误（应为YYYY-MM-DD）: {}", e)))
}
