// ==========================================
// 课程评教系统 - 外部能力接口 (Repository Traits)
// ==========================================
// 职责: 定义评教核心消费的数据访问能力（不包含业务逻辑）
// 实现者: 各 *Repository（使用 rusqlite）；测试中可替换为内存实现
// ==========================================

use crate::domain::{
    CourseOffering, EvaluationCriteria, Evaluation, EvaluationPeriod, OfferingSummary,
    PeriodStatus, Student,
};
use crate::repository::error::RepositoryResult;

// ==========================================
// CriteriaReader - 指标读取
// ==========================================
pub trait CriteriaReader: Send + Sync {
    /// 按录入顺序返回全部启用的指标（可能为空）
    fn list_active_criteria(&self) -> RepositoryResult<Vec<EvaluationCriteria>>;
}

// ==========================================
// PeriodStore - 评教周期读写
// ==========================================
pub trait PeriodStore: Send + Sync {
    /// 返回全部周期（不做缓存，每次调用重新读取）
    fn list_periods(&self) -> RepositoryResult<Vec<EvaluationPeriod>>;

    fn find_period(&self, period_id: &str) -> RepositoryResult<Option<EvaluationPeriod>>;

    fn insert_period(&self, period: &EvaluationPeriod) -> RepositoryResult<()>;

    /// 条件更新状态：仅当库中状态仍为 `expected` 时写入 `target`
    ///
    /// # 返回
    /// - Ok(true): 已更新
    /// - Ok(false): 状态已被他人推进（或周期不存在），未更新
    fn transition_status(
        &self,
        period_id: &str,
        expected: PeriodStatus,
        target: PeriodStatus,
    ) -> RepositoryResult<bool>;
}

// ==========================================
// OfferingReader - 开课查询
// ==========================================
pub trait OfferingReader: Send + Sync {
    fn find_offering(&self, offering_id: &str) -> RepositoryResult<Option<CourseOffering>>;

    /// 查询某班级在某学期的全部开课
    fn list_offerings_for_class(
        &self,
        class_id: &str,
        semester: &str,
    ) -> RepositoryResult<Vec<CourseOffering>>;
}

// ==========================================
// StudentDirectory - 学生班级归属
// ==========================================
pub trait StudentDirectory: Send + Sync {
    fn find_student(&self, student_id: &str) -> RepositoryResult<Option<Student>>;
}

// ==========================================
// EvaluationStore - 评教记录持久化
// ==========================================
// 红线: 只追加，不提供更新/删除
pub trait EvaluationStore: Send + Sync {
    /// (student, offering, period) 三元组是否已有评教记录
    fn exists(&self, student_id: &str, offering_id: &str, period_id: &str)
        -> RepositoryResult<bool>;

    /// 原子插入评教记录（含各项得分）
    ///
    /// 三元组已存在时必须返回 `RepositoryError::UniqueConstraintViolation`，
    /// 由存储层唯一索引裁决，不依赖调用方的预检查。
    fn insert_if_absent(&self, evaluation: &Evaluation) -> RepositoryResult<()>;

    fn find_by_id(&self, evaluation_id: &str) -> RepositoryResult<Option<Evaluation>>;

    /// 学生的历史评教（按提交时间倒序）
    fn list_by_student(&self, student_id: &str) -> RepositoryResult<Vec<Evaluation>>;

    /// 开课在某周期内的评教汇总
    fn summarize_offering(
        &self,
        offering_id: &str,
        period_id: &str,
    ) -> RepositoryResult<OfferingSummary>;
}
