// ==========================================
// 并发提交测试
// ==========================================
// 职责: 验证多客户端（多连接）同时提交同一三元组时只有一条记录落库
// ==========================================

#[path = "test_helpers.rs"]
mod test_helpers;

#[cfg(test)]
mod concurrent_submission_test {
    use course_evaluation::app::AppState;
    use course_evaluation::domain::PeriodStatus;
    use course_evaluation::engine::SubmitError;
    use course_evaluation::repository::EvaluationStore;
    use futures::future::join_all;
    use std::sync::Arc;

    use crate::test_helpers::{at, create_test_db, d, request, seed_period, seed_roster};

    const CLIENTS: usize = 8;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_duplicate_submissions_only_one_wins() {
        course_evaluation::logging::init_test();
        let (_temp, path) = create_test_db().unwrap();

        let seed = AppState::new(path.clone()).unwrap();
        seed_period(&seed, "P1", d(2025, 12, 1), d(2025, 12, 31), PeriodStatus::Active);
        seed_roster(&seed);

        // 每个客户端独立连接
        let clients: Vec<Arc<AppState>> = (0..CLIENTS)
            .map(|_| Arc::new(AppState::new(path.clone()).unwrap()))
            .collect();

        let now = at(d(2025, 12, 5), 10);
        let handles = clients.iter().cloned().map(|state| {
            tokio::spawn(async move { state.submitter.submit(request("S001", "O1", "P1"), now).await })
        });

        let results: Vec<Result<String, SubmitError>> = join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();

        let accepted = results.iter().filter(|r| r.is_ok()).count();
        let duplicates = results
            .iter()
            .filter(|r| matches!(r, Err(SubmitError::AlreadySubmitted)))
            .count();
        assert_eq!(accepted, 1, "results: {:?}", results);
        assert_eq!(duplicates, CLIENTS - 1, "results: {:?}", results);

        let stored = seed.repos.evaluation_repo.list_by_student("S001").unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_distinct_students_all_succeed() {
        let (_temp, path) = create_test_db().unwrap();

        let seed = AppState::new(path.clone()).unwrap();
        seed_period(&seed, "P1", d(2025, 12, 1), d(2025, 12, 31), PeriodStatus::Active);
        seed_roster(&seed);

        let now = at(d(2025, 12, 5), 10);
        let handles = (1..=5).map(|i| {
            let state = Arc::new(AppState::new(path.clone()).unwrap());
            tokio::spawn(async move {
                state
                    .submitter
                    .submit(request(&format!("S{:03}", i), "O1", "P1"), now)
                    .await
            })
        });

        for joined in join_all(handles).await {
            assert!(joined.unwrap().is_ok());
        }

        let summary = seed
            .repos
            .evaluation_repo
            .summarize_offering("O1", "P1")
            .unwrap();
        assert_eq!(summary.evaluation_count, 5);
    }
}
