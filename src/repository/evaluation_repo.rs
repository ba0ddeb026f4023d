// ==========================================
// 课程评教系统 - 评教记录数据仓储
// ==========================================
// 红线: 评教记录只追加，不提供更新/删除
// 红线: (student_id, offering_id, period_id) 唯一性由 uq_evaluation_triple 索引裁决
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::evaluation::{Evaluation, OfferingSummary};
use crate::domain::types::Grade;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::ports::EvaluationStore;
use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{
    params, Connection, OptionalExtension, Result as SqliteResult, Row, TransactionBehavior,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

/// 提交时间存储格式（保留小数秒，读回后与写入值一致）
const SUBMITTED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

// ==========================================
// EvaluationRepository - 评教记录仓储
// ==========================================
/// 职责: 管理 evaluation / evaluation_score 表
pub struct EvaluationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl EvaluationRepository {
    /// 创建新的 EvaluationRepository 实例
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

    fn load_scores(conn: &Connection, evaluation_id: &str) -> SqliteResult<BTreeMap<String, i32>> {
        let mut stmt = conn.prepare(
            "SELECT criterion_id, raw_score FROM evaluation_score WHERE evaluation_id = ?1",
        )?;
        let rows = stmt.query_map(params![evaluation_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i32>(1)?))
        })?;
        rows.collect()
    }
}

impl EvaluationStore for EvaluationRepository {
    fn exists(
        &self,
        student_id: &str,
        offering_id: &str,
        period_id: &str,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let found = conn
            .query_row(
                r#"
                SELECT 1 FROM evaluation
                WHERE student_id = ?1 AND offering_id = ?2 AND period_id = ?3
                LIMIT 1
                "#,
                params![student_id, offering_id, period_id],
                |_row| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        Ok(found)
    }

    fn insert_if_absent(&self, evaluation: &Evaluation) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        // IMMEDIATE: 事务开始即取写锁，避免多连接下读锁升级失败
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            r#"
            INSERT INTO evaluation (
                evaluation_id, student_id, offering_id, period_id,
                comments, total_score, grade, submitted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                evaluation.evaluation_id,
                evaluation.student_id,
                evaluation.offering_id,
                evaluation.period_id,
                evaluation.comments,
                evaluation.total_score,
                evaluation.grade.to_db_str(),
                evaluation.submitted_at.format(SUBMITTED_AT_FORMAT).to_string(),
            ],
        )?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO evaluation_score (evaluation_id, criterion_id, raw_score)
                VALUES (?1, ?2, ?3)
                "#,
            )?;
            for (criterion_id, raw_score) in &evaluation.scores {
                stmt.execute(params![evaluation.evaluation_id, criterion_id, raw_score])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn find_by_id(&self, evaluation_id: &str) -> RepositoryResult<Option<Evaluation>> {
        let conn = self.get_conn()?;
        let evaluation = conn
            .query_row(
                r#"
                SELECT evaluation_id, student_id, offering_id, period_id,
                       comments, total_score, grade, submitted_at
                FROM evaluation
                WHERE evaluation_id = ?1
                "#,
                params![evaluation_id],
                map_evaluation_row,
            )
            .optional()?;

        match evaluation {
            Some(mut e) => {
                e.scores = Self::load_scores(&conn, &e.evaluation_id)?;
                Ok(Some(e))
            }
            None => Ok(None),
        }
    }

    fn list_by_student(&self, student_id: &str) -> RepositoryResult<Vec<Evaluation>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT evaluation_id, student_id, offering_id, period_id,
                   comments, total_score, grade, submitted_at
            FROM evaluation
            WHERE student_id = ?1
            ORDER BY submitted_at DESC
            "#,
        )?;

        let mut evaluations = stmt
            .query_map(params![student_id], map_evaluation_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        for e in evaluations.iter_mut() {
            e.scores = Self::load_scores(&conn, &e.evaluation_id)?;
        }

        Ok(evaluations)
    }

    fn summarize_offering(
        &self,
        offering_id: &str,
        period_id: &str,
    ) -> RepositoryResult<OfferingSummary> {
        let conn = self.get_conn()?;

        let (evaluation_count, average_total): (i64, Option<f64>) = conn.query_row(
            r#"
            SELECT COUNT(*), AVG(total_score)
            FROM evaluation
            WHERE offering_id = ?1 AND period_id = ?2
            "#,
            params![offering_id, period_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let mut stmt = conn.prepare(
            r#"
            SELECT grade, COUNT(*)
            FROM evaluation
            WHERE offering_id = ?1 AND period_id = ?2
            GROUP BY grade
            "#,
        )?;
        let rows = stmt
            .query_map(params![offering_id, period_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        let mut grade_distribution = HashMap::new();
        for (raw_grade, count) in rows {
            let grade = Grade::from_db_str(&raw_grade).ok_or_else(|| {
                RepositoryError::FieldValueError {
                    field: "grade".to_string(),
                    message: format!("未知的评教等级: {}", raw_grade),
                }
            })?;
            grade_distribution.insert(grade, count);
        }

        Ok(OfferingSummary {
            offering_id: offering_id.to_string(),
            period_id: period_id.to_string(),
            evaluation_count,
            average_total: average_total.map(|avg| (avg * 10.0).round() / 10.0),
            grade_distribution,
        })
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// 映射 evaluation 行（scores 由调用方补齐）
fn map_evaluation_row(row: &Row<'_>) -> SqliteResult<Evaluation> {
    let raw_grade: String = row.get(6)?;
    let grade = Grade::from_db_str(&raw_grade).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            6,
            Type::Text,
            format!("未知的评教等级: {}", raw_grade).into(),
        )
    })?;

    let raw_ts: String = row.get(7)?;
    let submitted_at = NaiveDateTime::parse_from_str(&raw_ts, SUBMITTED_AT_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?;

    Ok(Evaluation {
        evaluation_id: row.get(0)?,
        student_id: row.get(1)?,
        offering_id: row.get(2)?,
        period_id: row.get(3)?,
        scores: BTreeMap::new(),
        comments: row.get(4)?,
        total_score: row.get(5)?,
        grade,
        submitted_at,
    })
}
