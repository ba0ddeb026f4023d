// ==========================================
// 课程评教系统 - 评教周期数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑，状态推进规则由 PeriodManager 决定
// 约束: 周期只做状态更新，不删除
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::period::EvaluationPeriod;
use crate::domain::types::PeriodStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::ports::PeriodStore;
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// PeriodRepository - 评教周期仓储
// ==========================================
/// 职责: 管理 evaluation_period 表
pub struct PeriodRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PeriodRepository {
    /// 创建新的 PeriodRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

impl PeriodStore for PeriodRepository {
    fn list_periods(&self) -> RepositoryResult<Vec<EvaluationPeriod>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT period_id, name, semester, start_date, end_date, status
            FROM evaluation_period
            ORDER BY start_date DESC, period_id DESC
            "#,
        )?;

        let periods = stmt
            .query_map([], map_period_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(periods)
    }

    fn find_period(&self, period_id: &str) -> RepositoryResult<Option<EvaluationPeriod>> {
        let conn = self.get_conn()?;
        let period = conn
            .query_row(
                r#"
                SELECT period_id, name, semester, start_date, end_date, status
                FROM evaluation_period
                WHERE period_id = ?1
                "#,
                params![period_id],
                map_period_row,
            )
            .optional()?;

        Ok(period)
    }

    fn insert_period(&self, period: &EvaluationPeriod) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO evaluation_period (
                period_id, name, semester, start_date, end_date, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                period.period_id,
                period.name,
                period.semester,
                period.start_date.to_string(),
                period.end_date.to_string(),
                period.status.to_db_str(),
            ],
        )?;
        Ok(())
    }

    fn transition_status(
        &self,
        period_id: &str,
        expected: PeriodStatus,
        target: PeriodStatus,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE evaluation_period
            SET status = ?3
            WHERE period_id = ?1 AND status = ?2
            "#,
            params![period_id, expected.to_db_str(), target.to_db_str()],
        )?;
        Ok(affected > 0)
    }
}

// ==========================================
// 辅助函数
// ==========================================

fn parse_date_column(row: &Row<'_>, idx: usize) -> SqliteResult<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn map_period_row(row: &Row<'_>) -> SqliteResult<EvaluationPeriod> {
    let raw_status: String = row.get(5)?;
    let status = PeriodStatus::from_db_str(&raw_status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            Type::Text,
            format!("未知的周期状态: {}", raw_status).into(),
        )
    })?;

    Ok(EvaluationPeriod {
        period_id: row.get(0)?,
        name: row.get(1)?,
        semester: row.get(2)?,
        start_date: parse_date_column(row, 3)?,
        end_date: parse_date_column(row, 4)?,
        status,
    })
}
