// ==========================================
// 课程评教系统 - 主入口
// ==========================================
// 启动: 初始化日志 → 打开数据库并建表 → 对齐周期状态 → 输出当前周期
// ==========================================

use course_evaluation::app::{get_default_db_path, AppState};
use course_evaluation::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", course_evaluation::APP_NAME);
    tracing::info!("系统版本: {}", course_evaluation::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;

    let changed = state.admin_api.reconcile_periods()?;
    tracing::info!(changed, "评教周期状态已对齐");

    match state.evaluation_api.get_current_period()? {
        Some(period) => tracing::info!(
            period_id = %period.period_id,
            name = %period.name,
            start = %period.start_date,
            end = %period.end_date,
            "当前评教周期"
        ),
        None => tracing::info!("当前没有进行中的评教周期"),
    }

    match state.evaluation_api.get_criteria().await {
        Ok(criteria) => tracing::info!(count = criteria.len(), "评教指标已加载"),
        Err(e) => tracing::warn!(error = %e, "评教指标不可用，提交将被拒绝"),
    }

    Ok(())
}
