// ==========================================
// RDD 交期计算系统 - 计算输入/输出模型
// ==========================================
// 职责: 定义计算输入、装车窗口、计算结果
// 约定: 所有日期均为本地日历日期 (NaiveDate),不含时区
// ==========================================

use crate::domain::types::{CalculationError, SeasonStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// CalculationInput - 计算输入
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationInput {
    pub weight: f64,   // 磅
    pub distance: f64, // 英里
    pub load_date: NaiveDate,
    // 打包日期: 仅随记录保存,不参与计算
    #[serde(default)]
    pub pack_date: Option<NaiveDate>,
}

impl CalculationInput {
    pub fn new(weight: f64, distance: f64, load_date: NaiveDate) -> Self {
        Self {
            weight,
            distance,
            load_date,
            pack_date: None,
        }
    }

    pub fn with_pack_date(mut self, pack_date: NaiveDate) -> Self {
        self.pack_date = Some(pack_date);
        self
    }
}

// ==========================================
// LoadSpread - 装车窗口
// ==========================================
// 固定 7 个日历日: earliest = latest - 6
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSpread {
    pub earliest: NaiveDate,
    pub latest: NaiveDate,
}

// ==========================================
// CalculationResult - 计算结果
// ==========================================
/// 单次计算结果
///
/// 失败时 `error` 被设置,其余字段为占位值（0 天、占位日期、空展示文本、非旺季）,
/// 由调用方决定如何展示。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub transit_days: i64,
    pub rdd: NaiveDate,
    pub rdd_display: String,
    pub load_spread: LoadSpread,
    pub season_status: SeasonStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<CalculationError>,
}

impl CalculationResult {
    /// 构造失败结果（占位值）
    pub fn failure(error: CalculationError, placeholder_date: NaiveDate) -> Self {
        Self {
            transit_days: 0,
            rdd: placeholder_date,
            rdd_display: String::new(),
            load_spread: LoadSpread {
                earliest: placeholder_date,
                latest: placeholder_date,
            },
            season_status: SeasonStatus::NonPeak,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_uses_placeholders() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let r = CalculationResult::failure(CalculationError::OutOfRange, today);
        assert!(!r.is_success());
        assert_eq!(r.transit_days, 0);
        assert_eq!(r.rdd, today);
        assert_eq!(r.load_spread.earliest, today);
        assert_eq!(r.load_spread.latest, today);
        assert_eq!(r.season_status, SeasonStatus::NonPeak);
        assert!(r.rdd_display.is_empty());
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let r = CalculationResult::failure(CalculationError::ConfigurationMissing, today);
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["transitDays"], 0);
        assert_eq!(v["seasonStatus"], "Non-Peak");
        assert_eq!(v["error"], "CONFIGURATION_MISSING");
        assert_eq!(v["loadSpread"]["earliest"], "2024-03-01");
    }
}
