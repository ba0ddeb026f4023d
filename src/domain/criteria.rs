// ==========================================
// 课程评教系统 - 评教指标领域模型
// ==========================================
// 对齐: evaluation_criteria 表
// 红线: 指标由管理端维护，核心只读
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// EvaluationCriteria - 评教指标
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationCriteria {
    pub criterion_id: String, // 指标ID (唯一)
    pub name: String,         // 指标名称
    pub description: String,  // 指标说明
    pub weight: f64,          // 权重 (百分比 0-100)
    pub max_score: i32,       // 原始分上限 (正整数)
}

impl EvaluationCriteria {
    pub fn new(
        criterion_id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        weight: f64,
        max_score: i32,
    ) -> Self {
        Self {
            criterion_id: criterion_id.into(),
            name: name.into(),
            description: description.into(),
            weight,
            max_score,
        }
    }

    /// 原始分是否在 [0, max_score] 区间内
    pub fn accepts(&self, raw_score: i32) -> bool {
        (0..=self.max_score).contains(&raw_score)
    }
}

/// 默认评教指标（管理员尚未配置指标时使用）
///
/// 五项指标，权重 20/25/20/15/20，满分均为 100。
/// 兼容性测试依赖该集合，修改需同步测试。
pub fn default_criteria() -> Vec<EvaluationCriteria> {
    vec![
        EvaluationCriteria::new("C001", "教学态度", "教师备课充分、认真负责、为人师表", 20.0, 100),
        EvaluationCriteria::new("C002", "教学内容", "内容充实、重点突出、联系实际", 25.0, 100),
        EvaluationCriteria::new("C003", "教学方法", "讲解清晰、方法得当、启发思考", 20.0, 100),
        EvaluationCriteria::new("C004", "课堂管理", "课堂秩序良好、时间安排合理", 15.0, 100),
        EvaluationCriteria::new("C005", "师生互动", "积极答疑、鼓励参与、沟通顺畅", 20.0, 100),
    ]
}
