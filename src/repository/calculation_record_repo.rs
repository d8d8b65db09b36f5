// ==========================================
// RDD 交期计算系统 - 计算记录仓储
// ==========================================
// 职责: 管理 calculations（成功计算）与 usage_logs（每次尝试）两张表
// 说明: 载荷以 JSON 文本存储; created_at 以 "%Y-%m-%d %H:%M:%S" 存储,可直接按字符串比较
// ==========================================

use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::record::{CalculationRecord, UsageLog};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};

/// 时间戳存储格式
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(field: &str, raw: &str) -> RepositoryResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT).map_err(|e| {
        RepositoryError::FieldValueError {
            field: field.to_string(),
            message: format!("无法解析时间 '{}': {}", raw, e),
        }
    })
}

/// calculations 表原始行
type CalculationRow = (String, Option<String>, Option<String>, String, String, String);

pub struct CalculationRecordRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CalculationRecordRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(format!("{}: {}", db_path, e)))?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let repo = Self { conn };
        {
            let conn = repo.get_conn()?;
            init_schema(&conn)?;
        }
        Ok(repo)
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入
    // ==========================================

    /// 写入使用日志（每次计算尝试一条）
    pub fn insert_usage_log(&self, log: &UsageLog) -> RepositoryResult<()> {
        let details = serde_json::to_string(&log.details)?;
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO usage_logs (id, user_id, action_type, details, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                log.id,
                log.user_id,
                log.action_type,
                details,
                format_timestamp(log.created_at),
            ],
        )?;
        Ok(())
    }

    /// 写入计算记录（仅成功计算）
    pub fn insert_calculation(&self, record: &CalculationRecord) -> RepositoryResult<()> {
        let input_data = serde_json::to_string(&record.input_data)?;
        let result_data = serde_json::to_string(&record.result_data)?;
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO calculations (id, user_id, name, input_data, result_data, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                record.id,
                record.user_id,
                record.name,
                input_data,
                result_data,
                format_timestamp(record.created_at),
            ],
        )?;
        Ok(())
    }

    // ==========================================
    // 统计
    // ==========================================

    /// 统计使用日志条数（action_type 为空时统计全部）
    pub fn count_usage_logs(&self, action_type: Option<&str>) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = match action_type {
            Some(t) => conn.query_row(
                "SELECT COUNT(*) FROM usage_logs WHERE action_type = ?1",
                params![t],
                |row| row.get(0),
            )?,
            None => conn.query_row("SELECT COUNT(*) FROM usage_logs", [], |row| row.get(0))?,
        };
        Ok(count)
    }

    /// 统计时间窗口 [from, to) 内的使用日志条数; to 为空表示不设上限
    pub fn count_usage_logs_between(
        &self,
        action_type: &str,
        from: NaiveDateTime,
        to: Option<NaiveDateTime>,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = match to {
            Some(to) => conn.query_row(
                r#"
                SELECT COUNT(*) FROM usage_logs
                WHERE action_type = ?1 AND created_at >= ?2 AND created_at < ?3
                "#,
                params![action_type, format_timestamp(from), format_timestamp(to)],
                |row| row.get(0),
            )?,
            None => conn.query_row(
                "SELECT COUNT(*) FROM usage_logs WHERE action_type = ?1 AND created_at >= ?2",
                params![action_type, format_timestamp(from)],
                |row| row.get(0),
            )?,
        };
        Ok(count)
    }

    /// 列出某时间点之后的使用日志时间戳（升序,用于活动趋势）
    pub fn list_usage_log_times_since(
        &self,
        action_type: &str,
        from: NaiveDateTime,
    ) -> RepositoryResult<Vec<NaiveDateTime>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT created_at FROM usage_logs
            WHERE action_type = ?1 AND created_at >= ?2
            ORDER BY created_at ASC
            "#,
        )?;
        let raw = stmt
            .query_map(params![action_type, format_timestamp(from)], |row| {
                row.get::<_, String>(0)
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        raw.iter()
            .map(|s| parse_timestamp("usage_logs.created_at", s))
            .collect()
    }

    pub fn count_calculations(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM calculations", [], |row| row.get(0))?;
        Ok(count)
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 最近的计算记录（按创建时间倒序）
    pub fn list_recent_calculations(&self, limit: usize) -> RepositoryResult<Vec<CalculationRecord>> {
        let raw: Vec<CalculationRow> = {
            let conn = self.get_conn()?;
            let mut stmt = conn.prepare(
                r#"
                SELECT id, user_id, name, input_data, result_data, created_at
                FROM calculations
                ORDER BY created_at DESC, rowid DESC
                LIMIT ?1
                "#,
            )?;
            let rows = stmt
                .query_map(params![limit as i64], |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                    ))
                })?
                .collect::<SqliteResult<Vec<_>>>()?;
            rows
        };

        raw.into_iter()
            .map(|(id, user_id, name, input_data, result_data, created_at)| {
                Ok(CalculationRecord {
                    id,
                    user_id,
                    name,
                    input_data: serde_json::from_str(&input_data)?,
                    result_data: serde_json::from_str(&result_data)?,
                    created_at: parse_timestamp("calculations.created_at", &created_at)?,
                })
            })
            .collect()
    }

    /// 最近的使用日志（按创建时间倒序）
    pub fn list_recent_usage_logs(&self, limit: usize) -> RepositoryResult<Vec<UsageLog>> {
        let raw: Vec<(String, Option<String>, String, String, String)> = {
            let conn = self.get_conn()?;
            let mut stmt = conn.prepare(
                r#"
                SELECT id, user_id, action_type, details, created_at
                FROM usage_logs
                ORDER BY created_at DESC, rowid DESC
                LIMIT ?1
                "#,
            )?;
            let rows = stmt
                .query_map(params![limit as i64], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
                })?
                .collect::<SqliteResult<Vec<_>>>()?;
            rows
        };

        raw.into_iter()
            .map(|(id, user_id, action_type, details, created_at)| {
                Ok(UsageLog {
                    id,
                    user_id,
                    action_type,
                    details: serde_json::from_str(&details)?,
                    created_at: parse_timestamp("usage_logs.created_at", &created_at)?,
                })
            })
            .collect()
    }

    /// 最近计算的名称（按创建时间倒序,未命名为 None）
    pub fn list_calculation_names(&self, limit: usize) -> RepositoryResult<Vec<Option<String>>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT name FROM calculations ORDER BY created_at DESC, rowid DESC LIMIT ?1",
        )?;
        let names = stmt
            .query_map(params![limit as i64], |row| row.get::<_, Option<String>>(0))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(names)
    }
}
