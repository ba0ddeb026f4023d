// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================
#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use course_evaluation::app::AppState;
use course_evaluation::db::{init_schema, open_sqlite_connection};
use course_evaluation::domain::{
    CourseOffering, EvaluationPeriod, PeriodStatus, Student, SubmitRequest,
};
use course_evaluation::repository::PeriodStore;
use std::collections::BTreeMap;
use std::error::Error;
use tempfile::NamedTempFile;

/// 测试用学期
pub const SEMESTER: &str = "2025-2026-1";

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_string_lossy().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn at(date: NaiveDate, hour: u32) -> NaiveDateTime {
    date.and_hms_opt(hour, 0, 0).unwrap()
}

pub fn offering(offering_id: &str, class_id: &str) -> CourseOffering {
    CourseOffering {
        offering_id: offering_id.to_string(),
        course_id: format!("COURSE_{}", offering_id),
        course_name: format!("课程{}", offering_id),
        teacher_id: "T001".to_string(),
        teacher_name: "王老师".to_string(),
        class_id: class_id.to_string(),
        semester: SEMESTER.to_string(),
        schedule: "周一 1-2节".to_string(),
    }
}

pub fn student(student_id: &str, class_id: &str) -> Student {
    Student {
        student_id: student_id.to_string(),
        name: format!("学生{}", student_id),
        class_id: class_id.to_string(),
    }
}

/// 写入一个评教周期（指定状态）
pub fn seed_period(
    state: &AppState,
    period_id: &str,
    start: NaiveDate,
    end: NaiveDate,
    status: PeriodStatus,
) {
    let mut period = EvaluationPeriod::new(period_id, "期末评教", SEMESTER, start, end);
    period.status = status;
    state.repos.period_repo.insert_period(&period).unwrap();
}

/// 基础数据：CLASS_A 学生 S001-S005，开课 O1/O2；CLASS_B 开课 O_B
pub fn seed_roster(state: &AppState) {
    let students: Vec<Student> = (1..=5)
        .map(|i| student(&format!("S{:03}", i), "CLASS_A"))
        .collect();
    state.admin_api.sync_students(&students).unwrap();
    state
        .admin_api
        .sync_offerings(&[
            offering("O1", "CLASS_A"),
            offering("O2", "CLASS_A"),
            offering("O_B", "CLASS_B"),
        ])
        .unwrap();
}

/// 默认五项指标的完整评分（总分 88.25 → 88.3）
pub fn full_scores() -> BTreeMap<String, i32> {
    [("C001", 90), ("C002", 85), ("C003", 95), ("C004", 80), ("C005", 90)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

pub fn request(student_id: &str, offering_id: &str, period_id: &str) -> SubmitRequest {
    SubmitRequest {
        student_id: student_id.to_string(),
        offering_id: offering_id.to_string(),
        period_id: period_id.to_string(),
        raw_scores: full_scores(),
        comments: None,
    }
}
