// ==========================================
// 课程评教系统 - 评教记录领域模型
// ==========================================
// 对齐: evaluation / evaluation_score 表
// 红线: (student_id, offering_id, period_id) 唯一；记录只追加，不修改不删除
// ==========================================

use crate::domain::types::{EligibilityReason, Grade};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// 评教记录ID
pub type EvaluationId = String;

// ==========================================
// Evaluation - 评教记录
// ==========================================
// 对开课/周期只持有ID引用，不嵌入对象
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub evaluation_id: EvaluationId, // 提交时生成 (UUID v4)
    pub student_id: String,
    pub offering_id: String,
    pub period_id: String,

    // ===== 评分 =====
    pub scores: BTreeMap<String, i32>, // criterion_id → 原始分
    pub comments: Option<String>,      // 文字评语 (可选)
    pub total_score: f64,              // 加权总分 (0-100，一位小数)
    pub grade: Grade,                  // 评教等级

    pub submitted_at: NaiveDateTime, // 提交时间 (本地时钟)
}

// ==========================================
// SubmitRequest - 提交请求
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub student_id: String,
    pub offering_id: String,
    pub period_id: String,
    pub raw_scores: BTreeMap<String, i32>,
    pub comments: Option<String>,
}

// ==========================================
// EligibilityDecision - 提交资格判定结果
// ==========================================
// 仅供界面参考，不构成预占
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityDecision {
    pub allowed: bool,
    pub reason: EligibilityReason,
}

impl EligibilityDecision {
    pub fn ok() -> Self {
        Self {
            allowed: true,
            reason: EligibilityReason::Ok,
        }
    }

    pub fn from_reason(reason: EligibilityReason) -> Self {
        Self {
            allowed: reason == EligibilityReason::Ok,
            reason,
        }
    }
}

// ==========================================
// OfferingSummary - 开课评教汇总（只读统计）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferingSummary {
    pub offering_id: String,
    pub period_id: String,
    pub evaluation_count: i64,
    pub average_total: Option<f64>, // 无评教记录时为 None
    pub grade_distribution: HashMap<Grade, i64>,
}
