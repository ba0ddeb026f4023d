// ==========================================
// 课程评教系统 - 评教 API（学生端）
// ==========================================
// 职责: 面向展示层的评教入口
// 约定: 使用本地时钟；错误统一为 ApiError
// ==========================================

use crate::api::error::ApiResult;
use crate::domain::{
    CourseOffering, EligibilityDecision, Evaluation, EvaluationCriteria, EvaluationId,
    EvaluationPeriod, Grade, SubmitRequest,
};
use crate::engine::{
    CriteriaCatalog, EligibilityChecker, EvaluationSubmitter, PeriodManager, ScoringEngine,
};
use crate::repository::ports::EvaluationStore;
use chrono::{Local, NaiveDate};
use std::collections::BTreeMap;
use std::sync::Arc;

// ==========================================
// EvaluationApi - 评教API
// ==========================================
pub struct EvaluationApi {
    period_manager: Arc<PeriodManager>,
    eligibility: Arc<EligibilityChecker>,
    catalog: Arc<CriteriaCatalog>,
    submitter: Arc<EvaluationSubmitter>,
    evaluations: Arc<dyn EvaluationStore>,
}

impl EvaluationApi {
    pub fn new(
        period_manager: Arc<PeriodManager>,
        eligibility: Arc<EligibilityChecker>,
        catalog: Arc<CriteriaCatalog>,
        submitter: Arc<EvaluationSubmitter>,
        evaluations: Arc<dyn EvaluationStore>,
    ) -> Self {
        Self {
            period_manager,
            eligibility,
            catalog,
            submitter,
            evaluations,
        }
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 当前进行中的评教周期
    pub fn get_current_period(&self) -> ApiResult<Option<EvaluationPeriod>> {
        Ok(self.period_manager.get_current_active_period(Self::today())?)
    }

    /// 评分表使用的指标（库为空时按配置回退默认指标）
    pub async fn get_criteria(&self) -> ApiResult<Vec<EvaluationCriteria>> {
        Ok(self.catalog.resolve_criteria().await?)
    }

    /// 学生待评教的开课
    pub fn list_pending_offerings(&self, student_id: &str) -> ApiResult<Vec<CourseOffering>> {
        Ok(self
            .eligibility
            .list_pending_offerings(student_id, Self::today())?)
    }

    /// 学生的历史评教
    pub fn list_history(&self, student_id: &str) -> ApiResult<Vec<Evaluation>> {
        Ok(self.evaluations.list_by_student(student_id)?)
    }

    // ==========================================
    // 评教接口
    // ==========================================

    /// 提交资格检查（仅供界面提示）
    pub async fn can_submit(
        &self,
        student_id: &str,
        offering_id: &str,
        period_id: &str,
    ) -> ApiResult<EligibilityDecision> {
        Ok(self
            .eligibility
            .can_submit(student_id, offering_id, period_id, Self::today())?)
    }

    /// 提交评教
    pub async fn submit(&self, request: SubmitRequest) -> ApiResult<EvaluationId> {
        Ok(self.submitter.submit_now(request).await?)
    }

    /// 预览总分（不校验、不落库）
    pub async fn compute_total(&self, raw_scores: &BTreeMap<String, i32>) -> ApiResult<f64> {
        let criteria = self.catalog.resolve_criteria().await?;
        Ok(ScoringEngine::compute_total(&criteria, raw_scores))
    }

    pub fn compute_grade(&self, total: f64) -> Grade {
        ScoringEngine::compute_grade(total)
    }
}
