// ==========================================
// RDD 交期计算系统 - 参考数据领域模型
// ==========================================
// 职责: 重量区间、距离区间、运输天数对照、联邦假日、旺季
// 红线: 参考数据为只读快照,核心计算不修改、不持久化
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// WeightBracket - 重量区间（磅）
// ==========================================
// 闭区间: min_weight ≤ weight ≤ max_weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightBracket {
    pub id: i64,
    pub min_weight: f64,
    pub max_weight: f64,
}

impl WeightBracket {
    pub fn new(id: i64, min_weight: f64, max_weight: f64) -> Self {
        Self {
            id,
            min_weight,
            max_weight,
        }
    }

    /// 重量是否落在区间内（两端包含）
    pub fn contains(&self, weight: f64) -> bool {
        weight >= self.min_weight && weight <= self.max_weight
    }
}

// ==========================================
// DistanceBracket - 距离区间（英里）
// ==========================================
// 存储列名沿用 min_dist / max_dist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceBracket {
    pub id: i64,
    #[serde(rename = "min_dist")]
    pub min_distance: f64,
    #[serde(rename = "max_dist")]
    pub max_distance: f64,
}

impl DistanceBracket {
    pub fn new(id: i64, min_distance: f64, max_distance: f64) -> Self {
        Self {
            id,
            min_distance,
            max_distance,
        }
    }

    /// 距离是否落在区间内（两端包含）
    pub fn contains(&self, distance: f64) -> bool {
        distance >= self.min_distance && distance <= self.max_distance
    }
}

// ==========================================
// TransitTimeEntry - 运输天数对照
// ==========================================
// 每个 (weight_bracket_id, distance_bracket_id) 组合预期恰好一条

/// 运输天数绝对值上限（约 10 年）
pub const MAX_TRANSIT_DAYS: i64 = 3650;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitTimeEntry {
    pub id: i64,
    #[serde(rename = "weight_id")]
    pub weight_bracket_id: i64,
    #[serde(rename = "distance_id")]
    pub distance_bracket_id: i64,
    pub days: i64, // 日历天数（非工作日）
}

impl TransitTimeEntry {
    pub fn new(id: i64, weight_bracket_id: i64, distance_bracket_id: i64, days: i64) -> Self {
        Self {
            id,
            weight_bracket_id,
            distance_bracket_id,
            days,
        }
    }

    /// 天数是否在可推算范围内（允许负数）
    pub fn days_in_range(days: i64) -> bool {
        (-MAX_TRANSIT_DAYS..=MAX_TRANSIT_DAYS).contains(&days)
    }

    /// 是否匹配给定区间组合
    pub fn matches(&self, weight_bracket_id: i64, distance_bracket_id: i64) -> bool {
        self.weight_bracket_id == weight_bracket_id
            && self.distance_bracket_id == distance_bracket_id
    }
}

// ==========================================
// Holiday - 联邦假日
// ==========================================
// date 以 YYYY-MM-DD 序列化（chrono 默认格式）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub id: String,
    pub date: NaiveDate,
    pub name: String,
}

impl Holiday {
    pub fn new(date: NaiveDate, name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            date,
            name: name.into(),
        }
    }
}

// ==========================================
// PeakSeason - 旺季
// ==========================================
// 闭区间 [start_date, end_date],仅用于展示分类
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakSeason {
    pub id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub name: String,
}

impl PeakSeason {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate, name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            start_date,
            end_date,
            name: name.into(),
        }
    }

    /// 日期是否落在旺季区间内（两端包含）
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

// ==========================================
// ReferenceSnapshot - 参考数据快照
// ==========================================
/// 一次计算会话使用的完整参考数据
///
/// 由数据加载器一次性获取,之后以 `Arc` 共享给并发计算
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSnapshot {
    pub weights: Vec<WeightBracket>,
    pub distances: Vec<DistanceBracket>,
    pub times: Vec<TransitTimeEntry>,
    pub holidays: Vec<Holiday>,
    #[serde(rename = "peakSeasons", alias = "peak_seasons")]
    pub peak_seasons: Vec<PeakSeason>,
}

impl ReferenceSnapshot {
    /// 快照是否完全为空（常见于数据库未初始化）
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
            && self.distances.is_empty()
            && self.times.is_empty()
            && self.holidays.is_empty()
            && self.peak_seasons.is_empty()
    }
}
