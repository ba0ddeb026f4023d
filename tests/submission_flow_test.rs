// ==========================================
// 评教提交流程集成测试
// ==========================================
// 职责: 验证 资格判定 → 计分 → 落库 → 查询 的完整链路
// ==========================================

#[path = "test_helpers.rs"]
mod test_helpers;

#[cfg(test)]
mod submission_flow_test {
    use chrono::{Duration, Local};
    use course_evaluation::api::ApiError;
    use course_evaluation::app::AppState;
    use course_evaluation::domain::{EligibilityReason, Grade, PeriodStatus};
    use course_evaluation::engine::SubmitError;
    use course_evaluation::repository::EvaluationStore;

    use crate::test_helpers::{at, create_test_db, d, request, seed_period, seed_roster};

    fn setup() -> (tempfile::NamedTempFile, AppState) {
        course_evaluation::logging::init_test();
        let (temp, path) = create_test_db().unwrap();
        let state = AppState::new(path).unwrap();
        seed_period(&state, "P1", d(2025, 12, 1), d(2025, 12, 31), PeriodStatus::Active);
        seed_roster(&state);
        (temp, state)
    }

    #[tokio::test]
    async fn test_submit_then_read_back() {
        let (_temp, state) = setup();
        let now = at(d(2025, 12, 5), 10);

        let mut req = request("S001", "O1", "P1");
        req.comments = Some("  条理清楚，案例丰富  ".to_string());
        let id = state.submitter.submit(req, now).await.unwrap();

        let stored = state.repos.evaluation_repo.find_by_id(&id).unwrap().unwrap();
        assert_eq!(stored.student_id, "S001");
        assert_eq!(stored.total_score, 88.3);
        assert_eq!(stored.grade, Grade::Good);
        assert_eq!(stored.comments.as_deref(), Some("条理清楚，案例丰富"));
        assert_eq!(stored.scores.get("C002"), Some(&85));

        let history = state.repos.evaluation_repo.list_by_student("S001").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].evaluation_id, id);
    }

    #[tokio::test]
    async fn test_duplicate_submission_rejected_and_single_record_kept() {
        let (_temp, state) = setup();
        let now = at(d(2025, 12, 5), 10);

        state.submitter.submit(request("S001", "O1", "P1"), now).await.unwrap();
        let second = state.submitter.submit(request("S001", "O1", "P1"), now).await;
        assert!(matches!(second, Err(SubmitError::AlreadySubmitted)));

        let summary = state
            .repos
            .evaluation_repo
            .summarize_offering("O1", "P1")
            .unwrap();
        assert_eq!(summary.evaluation_count, 1);
    }

    #[tokio::test]
    async fn test_same_student_may_evaluate_other_offerings() {
        let (_temp, state) = setup();
        let now = at(d(2025, 12, 5), 10);

        state.submitter.submit(request("S001", "O1", "P1"), now).await.unwrap();
        state.submitter.submit(request("S001", "O2", "P1"), now).await.unwrap();
        assert!(matches!(
            state.submitter.submit(request("S001", "O_B", "P1"), now).await,
            Err(SubmitError::OfferingNotFound)
        ));

        assert_eq!(state.repos.evaluation_repo.list_by_student("S001").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_summary_over_several_students() {
        let (_temp, state) = setup();
        let now = at(d(2025, 12, 5), 10);

        // 88.3 Good
        state.submitter.submit(request("S001", "O1", "P1"), now).await.unwrap();

        // 全 100 → 100.0 Excellent
        let mut excellent = request("S002", "O1", "P1");
        excellent.raw_scores.values_mut().for_each(|s| *s = 100);
        state.submitter.submit(excellent, now).await.unwrap();

        // 全 60 → 60.0 Poor
        let mut poor = request("S003", "O1", "P1");
        poor.raw_scores.values_mut().for_each(|s| *s = 60);
        state.submitter.submit(poor, now).await.unwrap();

        let summary = state
            .repos
            .evaluation_repo
            .summarize_offering("O1", "P1")
            .unwrap();
        assert_eq!(summary.evaluation_count, 3);
        // (88.3 + 100 + 60) / 3 = 82.766… → 82.8
        assert_eq!(summary.average_total, Some(82.8));
        assert_eq!(summary.grade_distribution.get(&Grade::Good), Some(&1));
        assert_eq!(summary.grade_distribution.get(&Grade::Excellent), Some(&1));
        assert_eq!(summary.grade_distribution.get(&Grade::Poor), Some(&1));
        assert_eq!(summary.grade_distribution.get(&Grade::Fair), None);
    }

    #[tokio::test]
    async fn test_api_facade_with_local_clock() {
        let (temp, path) = create_test_db().unwrap();
        let state = AppState::new(path).unwrap();
        let today = Local::now().date_naive();
        seed_period(
            &state,
            "P_NOW",
            today - Duration::days(1),
            today + Duration::days(14),
            PeriodStatus::NotStarted,
        );
        seed_roster(&state);

        let api = &state.evaluation_api;
        assert_eq!(api.get_current_period().unwrap().unwrap().period_id, "P_NOW");

        let decision = api.can_submit("S001", "O1", "P_NOW").await.unwrap();
        assert!(decision.allowed);

        let pending = api.list_pending_offerings("S001").unwrap();
        assert_eq!(pending.len(), 2);

        let preview = api.compute_total(&request("S001", "O1", "P_NOW").raw_scores).await.unwrap();
        assert_eq!(preview, 88.3);
        assert_eq!(api.compute_grade(preview), Grade::Good);

        api.submit(request("S001", "O1", "P_NOW")).await.unwrap();

        let decision = api.can_submit("S001", "O1", "P_NOW").await.unwrap();
        assert_eq!(decision.reason, EligibilityReason::AlreadySubmitted);

        let err = api.submit(request("S001", "O1", "P_NOW")).await.unwrap_err();
        assert!(matches!(err, ApiError::AlreadySubmitted));
        assert_eq!(err.to_response().code, "ALREADY_SUBMITTED");

        assert_eq!(api.list_history("S001").unwrap().len(), 1);
        assert_eq!(api.list_pending_offerings("S001").unwrap().len(), 1);
        drop(temp);
    }
}
