// ==========================================
// 课程评教系统 - 评教周期管理器
// ==========================================
// 状态机: NOT_STARTED --(到达开始日)--> ACTIVE --(超过结束日 / 管理员关闭)--> CLOSED
// 红线: 状态单调推进，已结束周期不可重开
// 约束: 不缓存周期状态，每次查询重新读取
// ==========================================

use crate::domain::period::EvaluationPeriod;
use crate::domain::types::PeriodStatus;
use crate::engine::error::PeriodError;
use crate::repository::error::RepositoryResult;
use crate::repository::ports::PeriodStore;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, instrument, warn};

// ==========================================
// PeriodManager - 评教周期管理器
// ==========================================
pub struct PeriodManager {
    store: Arc<dyn PeriodStore>,
}

impl PeriodManager {
    pub fn new(store: Arc<dyn PeriodStore>) -> Self {
        Self { store }
    }

    // ==========================================
    // 纯函数
    // ==========================================

    /// 仅根据日期推导状态
    pub fn derive_status(period: &EvaluationPeriod, today: NaiveDate) -> PeriodStatus {
        if today < period.start_date {
            PeriodStatus::NotStarted
        } else if today <= period.end_date {
            PeriodStatus::Active
        } else {
            PeriodStatus::Closed
        }
    }

    /// 将库中状态与日期推导状态对齐
    ///
    /// 取二者中更靠后的状态：日期只能推进状态，不能回退
    /// （管理员提前关闭的周期即使仍在窗口内也保持 CLOSED）
    pub fn reconcile_status(period: &EvaluationPeriod, today: NaiveDate) -> PeriodStatus {
        period.status.max(Self::derive_status(period, today))
    }

    /// start_date <= today <= end_date
    pub fn is_within_window(period: &EvaluationPeriod, today: NaiveDate) -> bool {
        period.start_date <= today && today <= period.end_date
    }

    /// 对齐后为 ACTIVE 且已到开始日
    ///
    /// 库中提前置为 ACTIVE 但尚未开始的周期不算当前周期
    pub fn is_open(period: &EvaluationPeriod, today: NaiveDate) -> bool {
        Self::reconcile_status(period, today) == PeriodStatus::Active && period.start_date <= today
    }

    /// 从候选周期中选出当前进行中的周期
    ///
    /// 多个周期同时进行时取开始日期最晚的；开始日期相同则取 period_id 较大者
    pub fn select_active(
        periods: impl IntoIterator<Item = EvaluationPeriod>,
        today: NaiveDate,
    ) -> Option<EvaluationPeriod> {
        periods
            .into_iter()
            .filter(|p| Self::is_open(p, today))
            .map(|mut p| {
                p.status = PeriodStatus::Active;
                p
            })
            .max_by(|a, b| {
                a.start_date
                    .cmp(&b.start_date)
                    .then_with(|| a.period_id.cmp(&b.period_id))
            })
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 获取当前进行中的评教周期
    ///
    /// 只在内存中对齐状态，不写库；持久化由 [`PeriodManager::reconcile_all`] 负责
    pub fn get_current_active_period(
        &self,
        today: NaiveDate,
    ) -> RepositoryResult<Option<EvaluationPeriod>> {
        let periods = self.store.list_periods()?;
        Ok(Self::select_active(periods, today))
    }

    pub fn find_period(&self, period_id: &str) -> RepositoryResult<Option<EvaluationPeriod>> {
        self.store.find_period(period_id)
    }

    /// 全部周期，状态按 today 对齐（不写库）
    pub fn list_periods(&self, today: NaiveDate) -> RepositoryResult<Vec<EvaluationPeriod>> {
        let mut periods = self.store.list_periods()?;
        for p in periods.iter_mut() {
            p.status = Self::reconcile_status(p, today);
        }
        Ok(periods)
    }

    // ==========================================
    // 管理操作
    // ==========================================

    /// 创建评教周期
    ///
    /// 初始状态按 today 推导；end_date < start_date 时拒绝
    #[instrument(skip(self, name, semester))]
    pub fn create_period(
        &self,
        period_id: &str,
        name: &str,
        semester: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<EvaluationPeriod, PeriodError> {
        let mut period = EvaluationPeriod::new(period_id, name, semester, start_date, end_date);
        if !period.has_valid_window() {
            return Err(PeriodError::InvalidWindow {
                start: start_date.to_string(),
                end: end_date.to_string(),
            });
        }

        period.status = Self::derive_status(&period, today);
        self.store.insert_period(&period)?;

        info!(period_id, status = %period.status, "评教周期已创建");
        Ok(period)
    }

    /// 将全部周期的库中状态与日期对齐
    ///
    /// # 返回
    /// - Ok(usize): 实际推进状态的周期数
    #[instrument(skip(self))]
    pub fn reconcile_all(&self, today: NaiveDate) -> Result<usize, PeriodError> {
        let mut changed = 0;
        for period in self.store.list_periods()? {
            let target = Self::reconcile_status(&period, today);
            if target == period.status {
                continue;
            }
            if self.transition_to(&period.period_id, target)? {
                info!(
                    period_id = %period.period_id,
                    from = %period.status,
                    to = %target,
                    "评教周期状态推进"
                );
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// 管理员关闭评教周期（不可逆）
    ///
    /// # 返回
    /// - Ok(true): 已关闭
    /// - Ok(false): 周期此前已关闭
    #[instrument(skip(self))]
    pub fn close_period(&self, period_id: &str) -> Result<bool, PeriodError> {
        let closed = self.transition_to(period_id, PeriodStatus::Closed)?;
        if closed {
            info!(period_id, "评教周期已由管理员关闭");
        } else {
            warn!(period_id, "评教周期已处于关闭状态");
        }
        Ok(closed)
    }

    /// 状态迁移（条件更新，并发安全）
    ///
    /// 逆向迁移返回 InvalidStateTransition；目标状态已达成返回 Ok(false)
    fn transition_to(&self, period_id: &str, target: PeriodStatus) -> Result<bool, PeriodError> {
        loop {
            let current = self
                .store
                .find_period(period_id)?
                .ok_or_else(|| PeriodError::NotFound(period_id.to_string()))?
                .status;

            if current == target {
                return Ok(false);
            }
            if !current.can_transition_to(target) {
                return Err(PeriodError::InvalidStateTransition {
                    from: current.to_string(),
                    to: target.to_string(),
                });
            }
            if self.store.transition_status(period_id, current, target)? {
                return Ok(true);
            }
            // 状态已被并发推进，重新读取后再判定（状态有限且单调，循环必然结束）
        }
    }
}
