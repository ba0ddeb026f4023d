// ==========================================
// 评教指标导入集成测试
// ==========================================
// 职责: 验证 CSV 导入后的指标参与计分，失败导入不影响现有指标
// ==========================================

#[path = "test_helpers.rs"]
mod test_helpers;

#[cfg(test)]
mod criteria_import_test {
    use course_evaluation::api::ApiError;
    use course_evaluation::app::AppState;
    use course_evaluation::config::config_keys;
    use course_evaluation::domain::{default_criteria, Grade, PeriodStatus};
    use course_evaluation::engine::{ScoreViolation, SubmitError};
    use course_evaluation::repository::EvaluationStore;
    use std::collections::BTreeMap;
    use std::io::Write;
    use tempfile::Builder;

    use crate::test_helpers::{at, create_test_db, d, request, seed_period, seed_roster};

    const CSV: &str = "criterion_id,name,description,weight,max_score
K1,课堂讲授,讲解清晰,50,10
K2,实验指导,指导到位,30,10
K3,课后答疑,答疑及时,20,5
";

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn setup() -> (tempfile::NamedTempFile, AppState) {
        let (temp, path) = create_test_db().unwrap();
        let state = AppState::new(path).unwrap();
        seed_period(&state, "P1", d(2025, 12, 1), d(2025, 12, 31), PeriodStatus::Active);
        seed_roster(&state);
        (temp, state)
    }

    #[tokio::test]
    async fn test_imported_criteria_drive_scoring() {
        let (_temp, state) = setup();
        let csv = write_csv(CSV);
        let count = state
            .admin_api
            .import_criteria_csv(&csv.path().to_string_lossy())
            .unwrap();
        assert_eq!(count, 3);

        let criteria = state.evaluation_api.get_criteria().await.unwrap();
        assert_eq!(criteria.len(), 3);
        assert_eq!(criteria[2].max_score, 5);

        // 9*50/100 + 8*30/100 + 5*20/100 = 4.5 + 2.4 + 1.0 = 7.9
        let mut req = request("S001", "O1", "P1");
        req.raw_scores = [("K1", 9), ("K2", 8), ("K3", 5)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect::<BTreeMap<_, _>>();
        let id = state.submitter.submit(req, at(d(2025, 12, 5), 10)).await.unwrap();
        let stored = state.repos.evaluation_repo.find_by_id(&id).unwrap().unwrap();
        assert_eq!(stored.total_score, 7.9);
        assert_eq!(stored.grade, Grade::Poor);

        // 旧的默认指标ID已不再有效
        assert!(matches!(
            state.submitter.submit(request("S002", "O1", "P1"), at(d(2025, 12, 5), 10)).await,
            Err(SubmitError::InvalidScore(ScoreViolation::UnknownCriterion { .. }))
        ));

        // 新指标的满分上限生效
        let mut over = request("S003", "O1", "P1");
        over.raw_scores = BTreeMap::from([("K3".to_string(), 6)]);
        assert!(matches!(
            state.submitter.submit(over, at(d(2025, 12, 5), 10)).await,
            Err(SubmitError::InvalidScore(ScoreViolation::OutOfRange { max_score: 5, .. }))
        ));
    }

    #[tokio::test]
    async fn test_failed_import_keeps_current_catalog() {
        let (_temp, state) = setup();
        let bad = write_csv("criterion_id,name,description,weight,max_score\nK1,a,,60,10\nK1,b,,40,10\n");

        let err = state
            .admin_api
            .import_criteria_csv(&bad.path().to_string_lossy())
            .unwrap_err();
        assert!(matches!(err, ApiError::ImportError(_)));
        assert_eq!(err.to_response().code, "IMPORT_ERROR");

        // 库仍为空，按默认指标计分
        assert!(state.admin_api.list_all_criteria().unwrap().is_empty());
        assert_eq!(state.evaluation_api.get_criteria().await.unwrap(), default_criteria());
    }

    #[tokio::test]
    async fn test_empty_catalog_without_fallback_rejects_submission() {
        let (_temp, state) = setup();
        state
            .admin_api
            .set_config_value(config_keys::CRITERIA_FALLBACK_ENABLED, "false")
            .unwrap();

        assert!(matches!(
            state.submitter.submit(request("S001", "O1", "P1"), at(d(2025, 12, 5), 10)).await,
            Err(SubmitError::CriteriaUnavailable(_))
        ));
        assert!(state.repos.evaluation_repo.list_by_student("S001").unwrap().is_empty());

        let snapshot = state.admin_api.get_config_snapshot().unwrap();
        assert!(snapshot.contains(config_keys::CRITERIA_FALLBACK_ENABLED));
    }
}
