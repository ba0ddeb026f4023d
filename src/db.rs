// ==========================================
// 课程评教系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，多客户端并发提交时等待写锁而不是立即失败
// - 建表语句集中在此，所有表均 IF NOT EXISTS（幂等）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化全部业务表（幂等）
///
/// 唯一约束 uq_evaluation_triple 是防止重复评教的最终裁决者，
/// 引擎层的资格检查只是提示性的。
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS evaluation_criteria (
            criterion_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            weight REAL NOT NULL CHECK (weight >= 0 AND weight <= 100),
            max_score INTEGER NOT NULL CHECK (max_score > 0),
            sort_order INTEGER NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS evaluation_period (
            period_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            semester TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'NOT_STARTED',
            CHECK (end_date >= start_date)
        );

        CREATE TABLE IF NOT EXISTS student (
            student_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            class_id TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS course_offering (
            offering_id TEXT PRIMARY KEY,
            course_id TEXT NOT NULL,
            course_name TEXT NOT NULL DEFAULT '',
            teacher_id TEXT NOT NULL,
            teacher_name TEXT NOT NULL DEFAULT '',
            class_id TEXT NOT NULL,
            semester TEXT NOT NULL,
            schedule TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS evaluation (
            evaluation_id TEXT PRIMARY KEY,
            student_id TEXT NOT NULL,
            offering_id TEXT NOT NULL,
            period_id TEXT NOT NULL REFERENCES evaluation_period(period_id),
            comments TEXT,
            total_score REAL NOT NULL,
            grade TEXT NOT NULL,
            submitted_at TEXT NOT NULL
        );

        CREATE UNIQUE INDEX IF NOT EXISTS uq_evaluation_triple
            ON evaluation (student_id, offering_id, period_id);

        CREATE INDEX IF NOT EXISTS idx_evaluation_offering
            ON evaluation (offering_id, period_id);

        CREATE TABLE IF NOT EXISTS evaluation_score (
            evaluation_id TEXT NOT NULL REFERENCES evaluation(evaluation_id),
            criterion_id TEXT NOT NULL,
            raw_score INTEGER NOT NULL,
            PRIMARY KEY (evaluation_id, criterion_id)
        );
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
