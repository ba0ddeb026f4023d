// ==========================================
// 课程评教系统 - 开课/学生数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 开课与学生数据由课程管理端维护，写入接口仅供同步/初始化使用
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::offering::{CourseOffering, Student};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::ports::{OfferingReader, StudentDirectory};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// OfferingRepository - 开课与学生仓储
// ==========================================
/// 职责: 管理 course_offering / student 表
pub struct OfferingRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OfferingRepository {
    /// 创建新的 OfferingRepository 实例
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

    /// 写入或覆盖开课记录（课程管理端同步用）
    pub fn upsert_offering(&self, offering: &CourseOffering) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO course_offering (
                offering_id, course_id, course_name, teacher_id, teacher_name,
                class_id, semester, schedule
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                offering.offering_id,
                offering.course_id,
                offering.course_name,
                offering.teacher_id,
                offering.teacher_name,
                offering.class_id,
                offering.semester,
                offering.schedule,
            ],
        )?;
        Ok(())
    }

    /// 写入或覆盖学生记录（课程管理端同步用）
    pub fn upsert_student(&self, student: &Student) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO student (student_id, name, class_id) VALUES (?1, ?2, ?3)",
            params![student.student_id, student.name, student.class_id],
        )?;
        Ok(())
    }
}

impl OfferingReader for OfferingRepository {
    fn find_offering(&self, offering_id: &str) -> RepositoryResult<Option<CourseOffering>> {
        let conn = self.get_conn()?;
        let offering = conn
            .query_row(
                r#"
                SELECT offering_id, course_id, course_name, teacher_id, teacher_name,
                       class_id, semester, schedule
                FROM course_offering
                WHERE offering_id = ?1
                "#,
                params![offering_id],
                map_offering_row,
            )
            .optional()?;

        Ok(offering)
    }

    fn list_offerings_for_class(
        &self,
        class_id: &str,
        semester: &str,
    ) -> RepositoryResult<Vec<CourseOffering>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT offering_id, course_id, course_name, teacher_id, teacher_name,
                   class_id, semester, schedule
            FROM course_offering
            WHERE class_id = ?1 AND semester = ?2
            ORDER BY offering_id ASC
            "#,
        )?;

        let offerings = stmt
            .query_map(params![class_id, semester], map_offering_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(offerings)
    }
}

impl StudentDirectory for OfferingRepository {
    fn find_student(&self, student_id: &str) -> RepositoryResult<Option<Student>> {
        let conn = self.get_conn()?;
        let student = conn
            .query_row(
                "SELECT student_id, name, class_id FROM student WHERE student_id = ?1",
                params![student_id],
                |row| {
                    Ok(Student {
                        student_id: row.get(0)?,
                        name: row.get(1)?,
                        class_id: row.get(2)?,
                    })
                },
            )
            .optional()?;

        Ok(student)
    }
}

fn map_offering_row(row: &Row<'_>) -> SqliteResult<CourseOffering> {
    Ok(CourseOffering {
        offering_id: row.get(0)?,
        course_id: row.get(1)?,
        course_name: row.get(2)?,
        teacher_id: row.get(3)?,
        teacher_name: row.get(4)?,
        class_id: row.get(5)?,
        semester: row.get(6)?,
        schedule: row.get(7)?,
    })
}
