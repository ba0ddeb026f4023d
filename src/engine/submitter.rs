// ==========================================
// 课程评教系统 - 评教提交器
// ==========================================
// 流程: 资格复核 → 指标解析 → 得分校验 → 评语规整 → 计分定级 → 原子写入
// 红线: 重复提交的最终裁决在存储层唯一索引，资格检查只是前置提示
// ==========================================

use crate::config::EvaluationConfigReader;
use crate::domain::evaluation::{Evaluation, EvaluationId, SubmitRequest};
use crate::engine::criteria_catalog::CriteriaCatalog;
use crate::engine::eligibility::EligibilityChecker;
use crate::engine::error::SubmitError;
use crate::engine::scoring::ScoringEngine;
use crate::repository::ports::EvaluationStore;
use chrono::{Local, NaiveDateTime};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

// ==========================================
// EvaluationSubmitter - 评教提交器
// ==========================================
pub struct EvaluationSubmitter {
    eligibility: Arc<EligibilityChecker>,
    catalog: Arc<CriteriaCatalog>,
    config: Arc<dyn EvaluationConfigReader>,
    store: Arc<dyn EvaluationStore>,
}

impl EvaluationSubmitter {
    pub fn new(
        eligibility: Arc<EligibilityChecker>,
        catalog: Arc<CriteriaCatalog>,
        config: Arc<dyn EvaluationConfigReader>,
        store: Arc<dyn EvaluationStore>,
    ) -> Self {
        Self {
            eligibility,
            catalog,
            config,
            store,
        }
    }

    /// 提交评教
    ///
    /// # 参数
    /// - request: 提交请求
    /// - now: 提交时刻（本地时钟），其日期用于资格复核
    ///
    /// # 返回
    /// - Ok(EvaluationId): 新记录ID
    /// - Err(SubmitError): 拒绝原因；任何失败都不会留下部分写入
    #[instrument(
        skip(self, request),
        fields(
            student_id = %request.student_id,
            offering_id = %request.offering_id,
            period_id = %request.period_id
        )
    )]
    pub async fn submit(
        &self,
        request: SubmitRequest,
        now: NaiveDateTime,
    ) -> Result<EvaluationId, SubmitError> {
        // === 步骤 1: 资格复核 ===
        let decision = self.eligibility.can_submit(
            &request.student_id,
            &request.offering_id,
            &request.period_id,
            now.date(),
        )?;
        if let Some(err) = SubmitError::from_reason(decision.reason) {
            warn!(reason = %decision.reason, "评教提交被拒绝");
            return Err(err);
        }

        // === 步骤 2: 指标与得分校验 ===
        let criteria = self.catalog.resolve_criteria().await?;
        let require_complete = self
            .config
            .get_require_complete_scores()
            .await
            .map_err(|e| SubmitError::PersistenceFailure(e.to_string()))?;
        ScoringEngine::validate_scores(&criteria, &request.raw_scores, require_complete).map_err(
            |violation| {
                warn!(%violation, "评分校验失败");
                violation
            },
        )?;

        let comments = self.normalize_comments(request.comments).await?;

        // === 步骤 3: 计分定级 ===
        let total_score = ScoringEngine::compute_total(&criteria, &request.raw_scores);
        let grade = ScoringEngine::compute_grade(total_score);

        // === 步骤 4: 原子写入 ===
        let evaluation = Evaluation {
            evaluation_id: Uuid::new_v4().to_string(),
            student_id: request.student_id,
            offering_id: request.offering_id,
            period_id: request.period_id,
            scores: request.raw_scores,
            comments,
            total_score,
            grade,
            submitted_at: now,
        };

        if let Err(e) = self.store.insert_if_absent(&evaluation) {
            let err = SubmitError::from(e);
            warn!(error = %err, "评教记录写入失败");
            return Err(err);
        }

        info!(
            evaluation_id = %evaluation.evaluation_id,
            total_score,
            grade = %grade,
            "评教提交成功"
        );
        Ok(evaluation.evaluation_id)
    }

    /// 以当前本地时间提交
    pub async fn submit_now(&self, request: SubmitRequest) -> Result<EvaluationId, SubmitError> {
        self.submit(request, Local::now().naive_local()).await
    }

    /// 评语规整：去除首尾空白，空串视为无评语，超长拒绝
    async fn normalize_comments(
        &self,
        comments: Option<String>,
    ) -> Result<Option<String>, SubmitError> {
        let Some(trimmed) = comments
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
        else {
            return Ok(None);
        };

        let max_chars = self
            .config
            .get_max_comment_chars()
            .await
            .map_err(|e| SubmitError::PersistenceFailure(e.to_string()))?;
        let actual_chars = trimmed.chars().count();
        if actual_chars > max_chars {
            return Err(SubmitError::InvalidComment {
                max_chars,
                actual_chars,
            });
        }
        Ok(Some(trimmed))
    }
}
