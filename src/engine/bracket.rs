// ==========================================
// RDD 交期计算系统 - 区间解析引擎
// ==========================================
// 职责: (重量, 距离) → 运输天数; 装车日 → 旺季分类
// 规则:
// - 区间判定为闭区间 min ≤ x ≤ max
// - 多个区间同时命中时取迭代顺序中的第一个（不检测重叠）
// ==========================================

use crate::domain::reference::{DistanceBracket, PeakSeason, TransitTimeEntry, WeightBracket};
use crate::domain::types::{CalculationError, SeasonStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// TransitResolution - 解析结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitResolution {
    pub weight_bracket_id: i64,
    pub distance_bracket_id: i64,
    pub days: i64,
}

/// 查找第一个包含该重量的区间
pub fn find_weight_bracket(weight: f64, brackets: &[WeightBracket]) -> Option<&WeightBracket> {
    brackets.iter().find(|b| b.contains(weight))
}

/// 查找第一个包含该距离的区间
pub fn find_distance_bracket(
    distance: f64,
    brackets: &[DistanceBracket],
) -> Option<&DistanceBracket> {
    brackets.iter().find(|b| b.contains(distance))
}

/// 解析运输天数
///
/// # 返回
/// - `Ok(TransitResolution)`: days 原样返回（不取整、不截断）
/// - `Err(OutOfRange)`: 重量或距离不在任何区间
/// - `Err(ConfigurationMissing)`: 区间组合没有对应运输天数
pub fn resolve_transit_days(
    weight: f64,
    distance: f64,
    weights: &[WeightBracket],
    distances: &[DistanceBracket],
    times: &[TransitTimeEntry],
) -> Result<TransitResolution, CalculationError> {
    let weight_bracket =
        find_weight_bracket(weight, weights).ok_or(CalculationError::OutOfRange)?;
    let distance_bracket =
        find_distance_bracket(distance, distances).ok_or(CalculationError::OutOfRange)?;

    let entry = times
        .iter()
        .find(|t| t.matches(weight_bracket.id, distance_bracket.id))
        .ok_or(CalculationError::ConfigurationMissing)?;

    Ok(TransitResolution {
        weight_bracket_id: weight_bracket.id,
        distance_bracket_id: distance_bracket.id,
        days: entry.days,
    })
}

/// 旺季分类
///
/// 装车日落在任一旺季闭区间内即为旺季,命中即返回; 区间重叠不视为错误
pub fn classify_season(load_date: NaiveDate, seasons: &[PeakSeason]) -> SeasonStatus {
    if seasons.iter().any(|s| s.contains(load_date)) {
        SeasonStatus::PeakSeason
    } else {
        SeasonStatus::NonPeak
    }
}
