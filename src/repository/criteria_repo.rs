// ==========================================
// 课程评教系统 - 评教指标数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 指标只停用不删除，历史评教仍可回溯
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::criteria::EvaluationCriteria;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::ports::CriteriaReader;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// CriteriaRepository - 评教指标仓储
// ==========================================
/// 职责: 管理 evaluation_criteria 表
pub struct CriteriaRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CriteriaRepository {
    /// 创建新的 CriteriaRepository 实例
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

    /// 整体替换启用中的指标集合
    ///
    /// 在同一事务内:
    /// 1) 停用全部现有指标
    /// 2) 按传入顺序写入/覆盖指标并启用
    ///
    /// # 返回
    /// - Ok(usize): 写入的指标数量
    pub fn replace_catalog(&self, criteria: &[EvaluationCriteria]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute("UPDATE evaluation_criteria SET is_active = 0", [])?;

        let mut count = 0;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO evaluation_criteria (
                    criterion_id, name, description, weight, max_score, sort_order, is_active
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1)
                ON CONFLICT(criterion_id) DO UPDATE SET
                    name = excluded.name,
                    description = excluded.description,
                    weight = excluded.weight,
                    max_score = excluded.max_score,
                    sort_order = excluded.sort_order,
                    is_active = 1
                "#,
            )?;

            for (idx, c) in criteria.iter().enumerate() {
                stmt.execute(params![
                    c.criterion_id,
                    c.name,
                    c.description,
                    c.weight,
                    c.max_score,
                    idx as i64,
                ])?;
                count += 1;
            }
        }

        tx.commit()?;
        Ok(count)
    }

    /// 查询全部指标（含已停用），按录入顺序
    pub fn list_all(&self) -> RepositoryResult<Vec<(EvaluationCriteria, bool)>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT criterion_id, name, description, weight, max_score, is_active
            FROM evaluation_criteria
            ORDER BY sort_order ASC, rowid ASC
            "#,
        )?;

        let rows = stmt
            .query_map([], |row| Ok((map_criteria_row(row)?, row.get::<_, i64>(5)? != 0)))?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rows)
    }
}

impl CriteriaReader for CriteriaRepository {
    fn list_active_criteria(&self) -> RepositoryResult<Vec<EvaluationCriteria>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT criterion_id, name, description, weight, max_score
            FROM evaluation_criteria
            WHERE is_active = 1
            ORDER BY sort_order ASC, rowid ASC
            "#,
        )?;

        let criteria = stmt
            .query_map([], map_criteria_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(criteria)
    }
}

fn map_criteria_row(row: &Row<'_>) -> SqliteResult<EvaluationCriteria> {
    Ok(EvaluationCriteria {
        criterion_id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        weight: row.get(3)?,
        max_score: row.get(4)?,
    })
}
