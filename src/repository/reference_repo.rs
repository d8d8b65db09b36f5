// ==========================================
// RDD 交期计算系统 - 参考数据仓储
// ==========================================
// 职责: 管理 transit_weights / transit_distances / transit_times /
//       federal_holidays / peak_seasons 五张参考表
// 红线: Repository 不含业务逻辑; 日期统一以 YYYY-MM-DD 文本存储
// ==========================================

use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::reference::{
    DistanceBracket, Holiday, PeakSeason, ReferenceSnapshot, TransitTimeEntry, WeightBracket,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// 数据库日期格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 解析库内日期文本
fn parse_stored_date(field: &str, raw: &str) -> RepositoryResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|e| {
        RepositoryError::FieldValueError {
            field: field.to_string(),
            message: format!("无法解析日期 '{}': {}", raw, e),
        }
    })
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub struct ReferenceDataRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ReferenceDataRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(format!("{}: {}", db_path, e)))?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let repo = Self { conn };
        repo.ensure_schema()?;
        Ok(repo)
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 确保表存在
    fn ensure_schema(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        init_schema(&conn)?;
        Ok(())
    }

    // ==========================================
    // 重量区间
    // ==========================================

    /// 列出重量区间（按下限升序,决定“第一条命中”的顺序）
    pub fn list_weight_brackets(&self) -> RepositoryResult<Vec<WeightBracket>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, min_weight, max_weight FROM transit_weights ORDER BY min_weight ASC, id ASC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(WeightBracket {
                    id: row.get(0)?,
                    min_weight: row.get(1)?,
                    max_weight: row.get(2)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 新增或更新重量区间（按 id）
    pub fn upsert_weight_bracket(&self, bracket: &WeightBracket) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO transit_weights (id, min_weight, max_weight)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                min_weight = excluded.min_weight,
                max_weight = excluded.max_weight
            "#,
            params![bracket.id, bracket.min_weight, bracket.max_weight],
        )?;
        Ok(())
    }

    /// 删除重量区间（级联删除引用它的运输天数）
    pub fn delete_weight_bracket(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM transit_weights WHERE id = ?1", params![id])?;
        Ok(affected)
    }

    // ==========================================
    // 距离区间
    // ==========================================

    /// 列出距离区间（按下限升序）
    pub fn list_distance_brackets(&self) -> RepositoryResult<Vec<DistanceBracket>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, min_dist, max_dist FROM transit_distances ORDER BY min_dist ASC, id ASC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(DistanceBracket {
                    id: row.get(0)?,
                    min_distance: row.get(1)?,
                    max_distance: row.get(2)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn upsert_distance_bracket(&self, bracket: &DistanceBracket) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO transit_distances (id, min_dist, max_dist)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                min_dist = excluded.min_dist,
                max_dist = excluded.max_dist
            "#,
            params![bracket.id, bracket.min_distance, bracket.max_distance],
        )?;
        Ok(())
    }

    pub fn delete_distance_bracket(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM transit_distances WHERE id = ?1", params![id])?;
        Ok(affected)
    }

    // ==========================================
    // 运输天数对照
    // ==========================================

    pub fn list_transit_times(&self) -> RepositoryResult<Vec<TransitTimeEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, weight_id, distance_id, days FROM transit_times ORDER BY id ASC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(TransitTimeEntry {
                    id: row.get(0)?,
                    weight_bracket_id: row.get(1)?,
                    distance_bracket_id: row.get(2)?,
                    days: row.get(3)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 按 (weight_id, distance_id) 新增或更新运输天数
    ///
    /// # 返回
    /// 记录 id（新增时为自增 id,更新时为原 id）
    pub fn upsert_transit_time(
        &self,
        weight_bracket_id: i64,
        distance_bracket_id: i64,
        days: i64,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO transit_times (weight_id, distance_id, days)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(weight_id, distance_id) DO UPDATE SET
                days = excluded.days
            "#,
            params![weight_bracket_id, distance_bracket_id, days],
        )?;
        let id: i64 = conn.query_row(
            "SELECT id FROM transit_times WHERE weight_id = ?1 AND distance_id = ?2",
            params![weight_bracket_id, distance_bracket_id],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    pub fn delete_transit_time(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM transit_times WHERE id = ?1", params![id])?;
        Ok(affected)
    }

    // ==========================================
    // 联邦假日
    // ==========================================

    /// 列出假日（按日期升序）
    pub fn list_holidays(&self) -> RepositoryResult<Vec<Holiday>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT id, date, name FROM federal_holidays ORDER BY date ASC")?;
        let raw = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        raw.into_iter()
            .map(|(id, date, name)| {
                Ok(Holiday {
                    id,
                    date: parse_stored_date("federal_holidays.date", &date)?,
                    name,
                })
            })
            .collect()
    }

    /// 新增或更新假日（按 id）
    pub fn upsert_holiday(&self, holiday: &Holiday) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO federal_holidays (id, date, name)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                date = excluded.date,
                name = excluded.name
            "#,
            params![holiday.id, format_date(holiday.date), holiday.name],
        )?;
        Ok(())
    }

    /// 按日期新增或更新假日（导入场景: 同一天只保留一条,更新名称）
    pub fn upsert_holiday_by_date(&self, holiday: &Holiday) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO federal_holidays (id, date, name)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(date) DO UPDATE SET
                name = excluded.name
            "#,
            params![holiday.id, format_date(holiday.date), holiday.name],
        )?;
        Ok(())
    }

    pub fn delete_holiday(&self, id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM federal_holidays WHERE id = ?1", params![id])?;
        Ok(affected)
    }

    // ==========================================
    // 旺季
    // ==========================================

    pub fn list_peak_seasons(&self) -> RepositoryResult<Vec<PeakSeason>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, start_date, end_date, name FROM peak_seasons ORDER BY start_date ASC",
        )?;
        let raw = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        raw.into_iter()
            .map(|(id, start, end, name)| {
                Ok(PeakSeason {
                    id,
                    start_date: parse_stored_date("peak_seasons.start_date", &start)?,
                    end_date: parse_stored_date("peak_seasons.end_date", &end)?,
                    name,
                })
            })
            .collect()
    }

    pub fn upsert_peak_season(&self, season: &PeakSeason) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO peak_seasons (id, start_date, end_date, name)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                start_date = excluded.start_date,
                end_date = excluded.end_date,
                name = excluded.name
            "#,
            params![
                season.id,
                format_date(season.start_date),
                format_date(season.end_date),
                season.name,
            ],
        )?;
        Ok(())
    }

    pub fn delete_peak_season(&self, id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM peak_seasons WHERE id = ?1", params![id])?;
        Ok(affected)
    }

    // ==========================================
    // 快照
    // ==========================================

    /// 一次性读取五张参考表
    pub fn load_snapshot(&self) -> RepositoryResult<ReferenceSnapshot> {
        let snapshot = ReferenceSnapshot {
            weights: self.list_weight_brackets()?,
            distances: self.list_distance_brackets()?,
            times: self.list_transit_times()?,
            holidays: self.list_holidays()?,
            peak_seasons: self.list_peak_seasons()?,
        };
        debug!(
            weights = snapshot.weights.len(),
            distances = snapshot.distances.len(),
            times = snapshot.times.len(),
            holidays = snapshot.holidays.len(),
            peak_seasons = snapshot.peak_seasons.len(),
            "参考数据快照已读取"
        );
        Ok(snapshot)
    }
}
