// ==========================================
// RDD 交期计算系统 - 参考数据字段映射
// ==========================================
// 职责: 原始行 → 参考数据记录（列名别名 + 类型转换）
// 列名匹配忽略大小写、空格、下划线与括号内单位
// ==========================================

use crate::domain::reference::{
    DistanceBracket, Holiday, PeakSeason, TransitTimeEntry, WeightBracket, MAX_TRANSIT_DAYS,
};
use crate::domain::types::ReferenceTable;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRow;
use chrono::{Duration, NaiveDate};

/// 运输天数行（按区间组合落库,不带 id）
#[derive(Debug, Clone, PartialEq)]
pub struct TransitTimeRow {
    pub weight_bracket_id: i64,
    pub distance_bracket_id: i64,
    pub days: i64,
}

/// 旺季行（id 可选,缺省时由导入器按名称与日期匹配或生成）
#[derive(Debug, Clone, PartialEq)]
pub struct PeakSeasonRow {
    pub id: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub name: String,
}

impl PeakSeasonRow {
    pub fn into_season(self, id: String) -> PeakSeason {
        PeakSeason {
            id,
            start_date: self.start_date,
            end_date: self.end_date,
            name: self.name,
        }
    }
}

/// 映射后的记录
#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceRecord {
    Weight(WeightBracket),
    Distance(DistanceBracket),
    TransitTime(TransitTimeRow),
    Holiday(Holiday),
    PeakSeason(PeakSeasonRow),
}

// ===== 列名别名 =====
const ID: &[&str] = &["id"];
const MIN_WEIGHT: &[&str] = &["min_weight", "Min Weight (lbs)", "weight_min", "min"];
const MAX_WEIGHT: &[&str] = &["max_weight", "Max Weight (lbs)", "weight_max", "max"];
const MIN_DISTANCE: &[&str] = &["min_dist", "min_distance", "Min Distance (miles)", "min"];
const MAX_DISTANCE: &[&str] = &["max_dist", "max_distance", "Max Distance (miles)", "max"];
const WEIGHT_ID: &[&str] = &["weight_id", "weight_bracket_id", "Weight Bracket"];
const DISTANCE_ID: &[&str] = &["distance_id", "distance_bracket_id", "Distance Bracket"];
const DAYS: &[&str] = &["days", "transit_days", "Transit Days"];
const DATE: &[&str] = &["date", "holiday_date", "Holiday Date"];
const NAME: &[&str] = &["name", "holiday_name", "season_name", "Name"];
const START_DATE: &[&str] = &["start_date", "start", "Start Date"];
const END_DATE: &[&str] = &["end_date", "end", "End Date"];

/// 列名归一化: 去掉括号内单位,只保留小写字母数字
fn normalize_header(header: &str) -> String {
    let without_unit = match header.find('(') {
        Some(idx) => &header[..idx],
        None => header,
    };
    without_unit
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

pub struct ReferenceFieldMapper;

impl ReferenceFieldMapper {
    /// 按表类型映射一行
    pub fn map_row(&self, table: ReferenceTable, row: &RawRow) -> ImportResult<ReferenceRecord> {
        let n = row.row_number;
        match table {
            ReferenceTable::Weights => Ok(ReferenceRecord::Weight(WeightBracket {
                id: self.require_i64(row, ID, n)?,
                min_weight: self.require_f64(row, MIN_WEIGHT, n)?,
                max_weight: self.require_f64(row, MAX_WEIGHT, n)?,
            })),
            ReferenceTable::Distances => Ok(ReferenceRecord::Distance(DistanceBracket {
                id: self.require_i64(row, ID, n)?,
                min_distance: self.require_f64(row, MIN_DISTANCE, n)?,
                max_distance: self.require_f64(row, MAX_DISTANCE, n)?,
            })),
            ReferenceTable::Times => Ok(ReferenceRecord::TransitTime(TransitTimeRow {
                weight_bracket_id: self.require_i64(row, WEIGHT_ID, n)?,
                distance_bracket_id: self.require_i64(row, DISTANCE_ID, n)?,
                days: self.require_transit_days(row, n)?,
            })),
            ReferenceTable::Holidays => {
                let date = self.require_date(row, DATE, n)?;
                let name = self.require_string(row, NAME, n)?;
                Ok(ReferenceRecord::Holiday(Holiday::new(date, name)))
            }
            ReferenceTable::PeakSeasons => Ok(ReferenceRecord::PeakSeason(PeakSeasonRow {
                id: self.get_string(row, ID),
                start_date: self.require_date(row, START_DATE, n)?,
                end_date: self.require_date(row, END_DATE, n)?,
                name: self.require_string(row, NAME, n)?,
            })),
        }
    }

    /// 提取字符串字段,按别名顺序取第一个非空值
    fn get_string(&self, row: &RawRow, aliases: &[&str]) -> Option<String> {
        for alias in aliases {
            let wanted = normalize_header(alias);
            let hit = row
                .fields
                .iter()
                .find(|(header, value)| normalize_header(header) == wanted && !value.trim().is_empty());
            if let Some((_, value)) = hit {
                return Some(value.trim().to_string());
            }
        }
        None
    }

    fn require_string(&self, row: &RawRow, aliases: &[&str], n: usize) -> ImportResult<String> {
        self.get_string(row, aliases)
            .ok_or_else(|| ImportError::MissingField {
                row: n,
                field: aliases[0].to_string(),
            })
    }

    fn require_f64(&self, row: &RawRow, aliases: &[&str], n: usize) -> ImportResult<f64> {
        let value = self.require_string(row, aliases, n)?;
        let cleaned = value.replace(',', "");
        match cleaned.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(ImportError::TypeConversionError {
                row: n,
                field: aliases[0].to_string(),
                message: format!("无法解析为数值: {}", value),
            }),
        }
    }

    /// 整数字段同时接受 "3" 与 Excel 导出的 "3.0"
    fn require_i64(&self, row: &RawRow, aliases: &[&str], n: usize) -> ImportResult<i64> {
        let value = self.require_string(row, aliases, n)?;
        if let Ok(v) = value.parse::<i64>() {
            return Ok(v);
        }
        match value.parse::<f64>() {
            Ok(v)
                if v.is_finite()
                    && v.fract() == 0.0
                    && v >= i64::MIN as f64
                    && v < i64::MAX as f64 =>
            {
                Ok(v as i64)
            }
            _ => Err(ImportError::TypeConversionError {
                row: n,
                field: aliases[0].to_string(),
                message: format!("无法解析为整数: {}", value),
            }),
        }
    }

    fn require_transit_days(&self, row: &RawRow, n: usize) -> ImportResult<i64> {
        let days = self.require_i64(row, DAYS, n)?;
        if !TransitTimeEntry::days_in_range(days) {
            return Err(ImportError::TypeConversionError {
                row: n,
                field: DAYS[0].to_string(),
                message: format!("运输天数超出范围 ±{}: {}", MAX_TRANSIT_DAYS, days),
            });
        }
        Ok(days)
    }

    /// 日期字段: YYYY-MM-DD / MM/DD/YYYY / Excel 日期序列号
    fn require_date(&self, row: &RawRow, aliases: &[&str], n: usize) -> ImportResult<NaiveDate> {
        let value = self.require_string(row, aliases, n)?;
        parse_date_cell(&value).ok_or_else(|| ImportError::DateFormatError {
            row: n,
            field: aliases[0].to_string(),
            value,
        })
    }
}

/// 解析日期单元格
pub fn parse_date_cell(value: &str) -> Option<NaiveDate> {
    let v = value.trim();
    let date_part = v.split(['T', ' ']).next().unwrap_or(v);
    if let Ok(d) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(date_part, "%m/%d/%Y") {
        return Some(d);
    }
    // Excel 序列号（1900 日期系统,基准 1899-12-30）
    let serial = v.parse::<f64>().ok()?;
    if !(1.0..=2_958_465.0).contains(&serial) {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(Duration::days(serial.trunc() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        RawRow {
            row_number: 2,
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[test]
    fn test_header_aliases() {
        let mapper = ReferenceFieldMapper;
        let r = row(&[("ID", "1"), ("Min Weight (lbs)", "0"), ("Max Weight (lbs)", "1,000")]);
        let rec = mapper.map_row(ReferenceTable::Weights, &r).unwrap();
        assert_eq!(rec, ReferenceRecord::Weight(WeightBracket::new(1, 0.0, 1000.0)));
    }

    #[test]
    fn test_transit_time_accepts_float_integers() {
        let mapper = ReferenceFieldMapper;
        let r = row(&[("weight_id", "1.0"), ("distance_id", "2"), ("days", "4")]);
        let rec = mapper.map_row(ReferenceTable::Times, &r).unwrap();
        assert_eq!(
            rec,
            ReferenceRecord::TransitTime(TransitTimeRow {
                weight_bracket_id: 1,
                distance_bracket_id: 2,
                days: 4
            })
        );
    }

    #[test]
    fn test_transit_days_beyond_limit_rejected() {
        let mapper = ReferenceFieldMapper;
        for days in ["200000000", "1e300", "-3651"] {
            let r = row(&[("weight_id", "1"), ("distance_id", "1"), ("days", days)]);
            let err = mapper.map_row(ReferenceTable::Times, &r).unwrap_err();
            assert!(
                matches!(err, ImportError::TypeConversionError { row: 2, .. }),
                "days={}",
                days
            );
        }

        let r = row(&[("weight_id", "1"), ("distance_id", "1"), ("days", "-3650")]);
        assert!(mapper.map_row(ReferenceTable::Times, &r).is_ok());
    }

    #[test]
    fn test_conversion_errors_carry_row() {
        let mapper = ReferenceFieldMapper;
        let r = row(&[("id", "1"), ("min_dist", "abc"), ("max_dist", "10")]);
        let err = mapper.map_row(ReferenceTable::Distances, &r).unwrap_err();
        assert!(matches!(err, ImportError::TypeConversionError { row: 2, .. }));

        let r = row(&[("date", "July 4"), ("name", "Independence Day")]);
        let err = mapper.map_row(ReferenceTable::Holidays, &r).unwrap_err();
        assert!(matches!(err, ImportError::DateFormatError { .. }));

        let r = row(&[("start_date", "2024-11-01"), ("end_date", "2024-12-31")]);
        let err = mapper.map_row(ReferenceTable::PeakSeasons, &r).unwrap_err();
        assert!(matches!(err, ImportError::MissingField { ref field, .. } if field == "name"));
    }

    #[test]
    fn test_parse_date_cell_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 7, 4).unwrap();
        assert_eq!(parse_date_cell("2024-07-04"), Some(expected));
        assert_eq!(parse_date_cell("07/04/2024"), Some(expected));
        assert_eq!(parse_date_cell("2024-07-04T00:00:00"), Some(expected));
        assert_eq!(parse_date_cell("45477"), Some(expected));
        assert_eq!(parse_date_cell("soon"), None);
    }
}
