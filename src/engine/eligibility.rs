// ==========================================
// 课程评教系统 - 提交资格判定
// ==========================================
// 职责: 判断学生能否对某开课在某周期提交评教
// 判定顺序: 周期 → 时间窗口 → 开课归属 → 重复提交
// 约束: 只读，结果仅供界面参考，不构成预占
// ==========================================

use crate::domain::evaluation::EligibilityDecision;
use crate::domain::offering::CourseOffering;
use crate::domain::types::{EligibilityReason, PeriodStatus};
use crate::engine::period_manager::PeriodManager;
use crate::repository::error::RepositoryResult;
use crate::repository::ports::{EvaluationStore, OfferingReader, StudentDirectory};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, instrument};

// ==========================================
// EligibilityChecker - 提交资格检查器
// ==========================================
pub struct EligibilityChecker {
    period_manager: Arc<PeriodManager>,
    offerings: Arc<dyn OfferingReader>,
    students: Arc<dyn StudentDirectory>,
    evaluations: Arc<dyn EvaluationStore>,
}

impl EligibilityChecker {
    /// 创建新的 EligibilityChecker 实例
    ///
    /// # 参数
    /// - period_manager: 周期管理器（每次判定重新读取周期）
    /// - offerings: 开课查询
    /// - students: 学生班级归属
    /// - evaluations: 评教记录（用于重复提交判定）
    pub fn new(
        period_manager: Arc<PeriodManager>,
        offerings: Arc<dyn OfferingReader>,
        students: Arc<dyn StudentDirectory>,
        evaluations: Arc<dyn EvaluationStore>,
    ) -> Self {
        Self {
            period_manager,
            offerings,
            students,
            evaluations,
        }
    }

    /// 判定提交资格
    ///
    /// # 参数
    /// - student_id: 学生ID
    /// - offering_id: 开课ID
    /// - period_id: 目标周期ID（必须是当前进行中的周期）
    /// - today: 当前日期
    ///
    /// # 返回
    /// - Ok(EligibilityDecision): 判定结果，仅 reason == OK 时 allowed 为 true
    /// - Err: 存储读取失败
    #[instrument(skip(self))]
    pub fn can_submit(
        &self,
        student_id: &str,
        offering_id: &str,
        period_id: &str,
        today: NaiveDate,
    ) -> RepositoryResult<EligibilityDecision> {
        let reason = self.evaluate(student_id, offering_id, period_id, today)?;
        debug!(reason = %reason, "资格判定完成");
        Ok(EligibilityDecision::from_reason(reason))
    }

    fn evaluate(
        &self,
        student_id: &str,
        offering_id: &str,
        period_id: &str,
        today: NaiveDate,
    ) -> RepositoryResult<EligibilityReason> {
        // === 步骤 1: 当前进行中的周期 ===
        let period = match self.period_manager.get_current_active_period(today)? {
            Some(p) if p.period_id == period_id => p,
            _ => return self.reason_for_inactive(period_id, today),
        };

        // === 步骤 3: 开课归属 ===
        let Some(offering) = self.offerings.find_offering(offering_id)? else {
            return Ok(EligibilityReason::OfferingNotFound);
        };
        let Some(student) = self.students.find_student(student_id)? else {
            return Ok(EligibilityReason::OfferingNotFound);
        };
        if offering.class_id != student.class_id || offering.semester != period.semester {
            return Ok(EligibilityReason::OfferingNotFound);
        }

        // === 步骤 4: 重复提交 ===
        if self.evaluations.exists(student_id, offering_id, period_id)? {
            return Ok(EligibilityReason::AlreadySubmitted);
        }

        Ok(EligibilityReason::Ok)
    }

    /// 目标周期不是当前周期时的原因
    ///
    /// 目标周期对齐后仍为 ACTIVE 但日期不在窗口内（库中提前置为 ACTIVE）→ OUTSIDE_WINDOW；
    /// 其余情况 → NO_ACTIVE_PERIOD
    fn reason_for_inactive(
        &self,
        period_id: &str,
        today: NaiveDate,
    ) -> RepositoryResult<EligibilityReason> {
        let reason = match self.period_manager.find_period(period_id)? {
            Some(p)
                if PeriodManager::reconcile_status(&p, today) == PeriodStatus::Active
                    && !PeriodManager::is_within_window(&p, today) =>
            {
                EligibilityReason::OutsideWindow
            }
            _ => EligibilityReason::NoActivePeriod,
        };
        Ok(reason)
    }

    /// 列出学生在当前周期内待评教的开课
    ///
    /// 无进行中周期或学生未知时返回空列表
    #[instrument(skip(self))]
    pub fn list_pending_offerings(
        &self,
        student_id: &str,
        today: NaiveDate,
    ) -> RepositoryResult<Vec<CourseOffering>> {
        let Some(period) = self.period_manager.get_current_active_period(today)? else {
            return Ok(Vec::new());
        };
        let Some(student) = self.students.find_student(student_id)? else {
            return Ok(Vec::new());
        };

        let mut pending = Vec::new();
        for offering in self
            .offerings
            .list_offerings_for_class(&student.class_id, &period.semester)?
        {
            if !self
                .evaluations
                .exists(student_id, &offering.offering_id, &period.period_id)?
            {
                pending.push(offering);
            }
        }
        Ok(pending)
    }
}
