// ==========================================
// 课程评教系统 - 评分引擎（纯函数库）
// ==========================================
// 职责: 加权总分计算、等级判定、得分/权重校验
// 红线: 无状态、无副作用、无 I/O 操作
// ==========================================

use crate::domain::criteria::EvaluationCriteria;
use crate::domain::types::Grade;
use crate::engine::error::ScoreViolation;
use std::collections::{BTreeMap, HashSet};

/// 浮点误差容忍度（用于四舍五入边界与权重求和）
const EPSILON: f64 = 1e-9;

/// 权重之和允许的偏差
const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

// ==========================================
// ScoringEngine - 纯函数工具类
// ==========================================
pub struct ScoringEngine;

impl ScoringEngine {
    /// 计算加权总分
    ///
    /// # 规则
    /// - 每项贡献 = s * weight / 100
    /// - 未评分的指标贡献 0，不导致整体失败
    /// - 合计后按四舍五入（round-half-up）保留一位小数
    ///
    /// 得分范围校验不在此处进行，见 [`ScoringEngine::validate_scores`]。
    ///
    /// # 示例
    /// ```
    /// use course_evaluation::domain::default_criteria;
    /// use course_evaluation::engine::ScoringEngine;
    /// use std::collections::BTreeMap;
    ///
    /// let scores: BTreeMap<String, i32> = [("C001", 90), ("C002", 85), ("C003", 95), ("C004", 80), ("C005", 90)]
    ///     .into_iter()
    ///     .map(|(k, v)| (k.to_string(), v))
    ///     .collect();
    /// assert_eq!(ScoringEngine::compute_total(&default_criteria(), &scores), 88.3);
    /// ```
    pub fn compute_total(
        criteria: &[EvaluationCriteria],
        raw_scores: &BTreeMap<String, i32>,
    ) -> f64 {
        // 先累计 s * weight，最后统一除以 100，减少中间舍入
        let weighted_sum: f64 = criteria
            .iter()
            .filter_map(|c| {
                raw_scores
                    .get(&c.criterion_id)
                    .map(|s| f64::from(*s) * c.weight)
            })
            .sum();

        Self::round_half_up(weighted_sum / 100.0, 1)
    }

    /// 根据总分判定等级
    ///
    /// # 规则
    /// - total >= 90 → Excellent
    /// - 80 <= total < 90 → Good
    /// - 70 <= total < 80 → Fair
    /// - total < 70 → Poor
    pub fn compute_grade(total: f64) -> Grade {
        if total >= 90.0 {
            Grade::Excellent
        } else if total >= 80.0 {
            Grade::Good
        } else if total >= 70.0 {
            Grade::Fair
        } else {
            Grade::Poor
        }
    }

    /// 四舍五入（half-up）到指定小数位
    ///
    /// 仅用于非负数；加 EPSILON 抵消 0.05 这类边界的二进制表示误差
    pub fn round_half_up(value: f64, decimals: u32) -> f64 {
        let factor = 10f64.powi(decimals as i32);
        ((value * factor) + 0.5 + EPSILON).floor() / factor
    }

    /// 校验原始得分
    ///
    /// # 规则
    /// 1. 每个键必须对应一个有效指标
    /// 2. 每个得分必须满足 0 <= s <= max_score
    /// 3. require_complete 为 true 时，每个指标都必须有得分
    pub fn validate_scores(
        criteria: &[EvaluationCriteria],
        raw_scores: &BTreeMap<String, i32>,
        require_complete: bool,
    ) -> Result<(), ScoreViolation> {
        for (criterion_id, score) in raw_scores {
            let criterion = criteria
                .iter()
                .find(|c| &c.criterion_id == criterion_id)
                .ok_or_else(|| ScoreViolation::UnknownCriterion {
                    criterion_id: criterion_id.clone(),
                })?;

            if !criterion.accepts(*score) {
                return Err(ScoreViolation::OutOfRange {
                    criterion_id: criterion_id.clone(),
                    score: *score,
                    max_score: criterion.max_score,
                });
            }
        }

        if require_complete {
            if let Some(missing) = criteria
                .iter()
                .find(|c| !raw_scores.contains_key(&c.criterion_id))
            {
                return Err(ScoreViolation::Missing {
                    criterion_id: missing.criterion_id.clone(),
                });
            }
        }

        Ok(())
    }

    /// 校验一组指标的权重之和是否为 100（配置期校验，评分时不强制）
    pub fn validate_weights(criteria: &[EvaluationCriteria]) -> Result<(), ScoreViolation> {
        let actual: f64 = criteria.iter().map(|c| c.weight).sum();
        if (actual - 100.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ScoreViolation::WeightSumMismatch { actual });
        }
        Ok(())
    }

    /// 找出重复的指标ID（配置期校验用）
    pub fn find_duplicate_ids(criteria: &[EvaluationCriteria]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for c in criteria {
            if !seen.insert(c.criterion_id.as_str()) && !duplicates.contains(&c.criterion_id) {
                duplicates.push(c.criterion_id.clone());
            }
        }
        duplicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::criteria::default_criteria;

    fn scores(pairs: &[(&str, i32)]) -> BTreeMap<String, i32> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn sample_scores() -> BTreeMap<String, i32> {
        scores(&[("C001", 90), ("C002", 85), ("C003", 95), ("C004", 80), ("C005", 90)])
    }

    #[test]
    fn test_reference_example_rounds_half_up() {
        // 18 + 21.25 + 19 + 12 + 18 = 88.25 → 88.3
        let total = ScoringEngine::compute_total(&default_criteria(), &sample_scores());
        assert_eq!(total, 88.3);
        assert_eq!(ScoringEngine::compute_grade(total), Grade::Good);
    }

    #[test]
    fn test_missing_criterion_contributes_zero() {
        let mut s = sample_scores();
        s.remove("C004");
        // 88.25 - 12 = 76.25 → 76.3
        let total = ScoringEngine::compute_total(&default_criteria(), &s);
        assert_eq!(total, 76.3);
        assert_eq!(ScoringEngine::compute_grade(total), Grade::Fair);
    }

    #[test]
    fn test_empty_scores_total_zero() {
        let total = ScoringEngine::compute_total(&default_criteria(), &BTreeMap::new());
        assert_eq!(total, 0.0);
        assert_eq!(ScoringEngine::compute_grade(total), Grade::Poor);
    }

    #[test]
    fn test_total_stays_within_bounds() {
        let criteria = default_criteria();
        for value in [0, 1, 33, 50, 67, 99, 100] {
            let s = scores(&[
                ("C001", value),
                ("C002", 100 - value),
                ("C003", value),
                ("C004", value / 2),
                ("C005", 100),
            ]);
            let total = ScoringEngine::compute_total(&criteria, &s);
            assert!((0.0..=100.0).contains(&total), "total={total}");
        }

        let full = scores(&[("C001", 100), ("C002", 100), ("C003", 100), ("C004", 100), ("C005", 100)]);
        assert_eq!(ScoringEngine::compute_total(&criteria, &full), 100.0);
    }

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(ScoringEngine::compute_grade(100.0), Grade::Excellent);
        assert_eq!(ScoringEngine::compute_grade(90.0), Grade::Excellent);
        assert_eq!(ScoringEngine::compute_grade(89.9), Grade::Good);
        assert_eq!(ScoringEngine::compute_grade(80.0), Grade::Good);
        assert_eq!(ScoringEngine::compute_grade(79.9), Grade::Fair);
        assert_eq!(ScoringEngine::compute_grade(70.0), Grade::Fair);
        assert_eq!(ScoringEngine::compute_grade(69.9), Grade::Poor);
        assert_eq!(ScoringEngine::compute_grade(0.0), Grade::Poor);
    }

    #[test]
    fn test_grade_is_monotonic() {
        let mut previous = ScoringEngine::compute_grade(0.0);
        for tenth in 0..=1000 {
            let grade = ScoringEngine::compute_grade(f64::from(tenth) / 10.0);
            assert!(grade >= previous, "grade dropped at {}", f64::from(tenth) / 10.0);
            previous = grade;
        }
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(ScoringEngine::round_half_up(88.25, 1), 88.3);
        assert_eq!(ScoringEngine::round_half_up(88.24, 1), 88.2);
        assert_eq!(ScoringEngine::round_half_up(0.05, 1), 0.1);
        assert_eq!(ScoringEngine::round_half_up(72.0, 1), 72.0);
    }

    #[test]
    fn test_fractional_weights() {
        let criteria = vec![
            EvaluationCriteria::new("A", "a", "", 33.5, 10),
            EvaluationCriteria::new("B", "b", "", 66.5, 10),
        ];
        // 7 * 33.5 / 100 + 9 * 66.5 / 100 = 2.345 + 5.985 = 8.33 → 8.3
        let total = ScoringEngine::compute_total(&criteria, &scores(&[("A", 7), ("B", 9)]));
        assert_eq!(total, 8.3);
    }

    #[test]
    fn test_validate_scores_rejects_out_of_range() {
        let mut s = sample_scores();
        s.insert("C003".to_string(), 101);
        let err = ScoringEngine::validate_scores(&default_criteria(), &s, false).unwrap_err();
        assert_eq!(
            err,
            ScoreViolation::OutOfRange {
                criterion_id: "C003".to_string(),
                score: 101,
                max_score: 100
            }
        );

        s.insert("C003".to_string(), -1);
        assert!(ScoringEngine::validate_scores(&default_criteria(), &s, false).is_err());
    }

    #[test]
    fn test_validate_scores_rejects_unknown_criterion() {
        let mut s = sample_scores();
        s.insert("C999".to_string(), 50);
        assert!(matches!(
            ScoringEngine::validate_scores(&default_criteria(), &s, false),
            Err(ScoreViolation::UnknownCriterion { .. })
        ));
    }

    #[test]
    fn test_validate_scores_completeness_policy() {
        let mut s = sample_scores();
        s.remove("C005");
        assert!(ScoringEngine::validate_scores(&default_criteria(), &s, false).is_ok());
        assert_eq!(
            ScoringEngine::validate_scores(&default_criteria(), &s, true),
            Err(ScoreViolation::Missing {
                criterion_id: "C005".to_string()
            })
        );
    }

    #[test]
    fn test_validate_weights() {
        assert!(ScoringEngine::validate_weights(&default_criteria()).is_ok());

        let mut criteria = default_criteria();
        criteria.pop();
        assert!(matches!(
            ScoringEngine::validate_weights(&criteria),
            Err(ScoreViolation::WeightSumMismatch { .. })
        ));
    }

    #[test]
    fn test_find_duplicate_ids() {
        let mut criteria = default_criteria();
        criteria.push(EvaluationCriteria::new("C002", "重复", "", 0.0, 100));
        assert_eq!(ScoringEngine::find_duplicate_ids(&criteria), vec!["C002".to_string()]);
    }
}
