// ==========================================
// RDD 交期计算系统 - 交期计算编排器
// ==========================================
// 职责: 区间解析 → RDD 推算 → 装车窗口 → 旺季分类 → 合并结果
// 输入: 重量、距离、装车日 + 参考数据快照
// 输出: CalculationResult（失败以 error 字段表示,不抛错）
// ==========================================

use crate::domain::calculation::{CalculationInput, CalculationResult};
use crate::domain::reference::{ReferenceSnapshot, TransitTimeEntry};
use crate::domain::types::CalculationError;
use crate::engine::bracket::{classify_season, resolve_transit_days};
use crate::engine::calendar::BusinessCalendar;
use crate::engine::formatting::format_date_for_display;
use crate::engine::projection::calculate_load_spread;
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

// ==========================================
// LoadedReference - 已加载的参考数据 + 预构建日历
// ==========================================
#[derive(Debug, Clone)]
struct LoadedReference {
    snapshot: Arc<ReferenceSnapshot>,
    calendar: BusinessCalendar,
}

// ==========================================
// RddCalculator - 交期计算器
// ==========================================
/// 交期计算器
///
/// 无内部可变状态; 持有不可变快照,可在多线程间共享
#[derive(Debug, Clone, Default)]
pub struct RddCalculator {
    reference: Option<LoadedReference>,
}

impl RddCalculator {
    /// 创建未加载数据的计算器（计算返回 DataNotLoaded）
    pub fn new() -> Self {
        Self { reference: None }
    }

    /// 基于快照创建计算器
    pub fn with_snapshot(snapshot: Arc<ReferenceSnapshot>) -> Self {
        let calendar = BusinessCalendar::new(&snapshot.holidays);
        debug!(holidays = calendar.holiday_count(), "工作日历已构建");
        Self {
            reference: Some(LoadedReference { snapshot, calendar }),
        }
    }

    /// 是否已加载参考数据
    pub fn is_loaded(&self) -> bool {
        self.reference.is_some()
    }

    /// 当前快照
    pub fn snapshot(&self) -> Option<&Arc<ReferenceSnapshot>> {
        self.reference.as_ref().map(|r| &r.snapshot)
    }

    /// 计算（占位日期取本地当天）
    pub fn calculate(&self, weight: f64, distance: f64, load_date: NaiveDate) -> CalculationResult {
        self.calculate_at(weight, distance, load_date, Local::now().date_naive())
    }

    /// 基于计算输入计算
    pub fn calculate_input(&self, input: &CalculationInput) -> CalculationResult {
        self.calculate(input.weight, input.distance, input.load_date)
    }

    /// 计算（显式指定失败时的占位日期）
    ///
    /// # 流程
    /// 1. 快照未加载 → DataNotLoaded
    /// 2. 重量/距离区间未命中 → OutOfRange
    /// 3. 区间组合无运输天数或天数越界 → ConfigurationMissing
    /// 4. 日期超出可表示范围 → OutOfRange
    /// 5. 成功 → RDD + 装车窗口 + 旺季分类
    #[instrument(skip(self, placeholder_date))]
    pub fn calculate_at(
        &self,
        weight: f64,
        distance: f64,
        load_date: NaiveDate,
        placeholder_date: NaiveDate,
    ) -> CalculationResult {
        let reference = match &self.reference {
            Some(r) => r,
            None => {
                debug!("参考数据未加载");
                return CalculationResult::failure(CalculationError::DataNotLoaded, placeholder_date);
            }
        };
        let snapshot = &reference.snapshot;

        let resolution = match resolve_transit_days(
            weight,
            distance,
            &snapshot.weights,
            &snapshot.distances,
            &snapshot.times,
        ) {
            Ok(r) => r,
            Err(error) => {
                debug!(error = error.code(), "运输天数解析失败");
                return CalculationResult::failure(error, placeholder_date);
            }
        };

        if !TransitTimeEntry::days_in_range(resolution.days) {
            warn!(transit_days = resolution.days, "运输天数越界,视为配置缺失");
            return CalculationResult::failure(CalculationError::ConfigurationMissing, placeholder_date);
        }

        let projected = reference
            .calendar
            .project_rdd(load_date, resolution.days)
            .zip(calculate_load_spread(load_date));
        let Some((rdd, load_spread)) = projected else {
            debug!(load_date = %load_date, "日期超出可表示范围");
            return CalculationResult::failure(CalculationError::OutOfRange, placeholder_date);
        };
        let season_status = classify_season(load_date, &snapshot.peak_seasons);

        debug!(
            weight_bracket_id = resolution.weight_bracket_id,
            distance_bracket_id = resolution.distance_bracket_id,
            transit_days = resolution.days,
            rdd = %rdd,
            season = %season_status,
            "交期计算完成"
        );

        CalculationResult {
            transit_days: resolution.days,
            rdd,
            rdd_display: format_date_for_display(rdd),
            load_spread,
            season_status,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reference::{
        DistanceBracket, Holiday, PeakSeason, TransitTimeEntry, WeightBracket,
    };
    use crate::domain::types::SeasonStatus;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn snapshot() -> Arc<ReferenceSnapshot> {
        Arc::new(ReferenceSnapshot {
            weights: vec![WeightBracket::new(1, 0.0, 1000.0)],
            distances: vec![
                DistanceBracket::new(1, 0.0, 500.0),
                DistanceBracket::new(2, 501.0, 1000.0),
            ],
            times: vec![TransitTimeEntry::new(1, 1, 1, 3)],
            holidays: vec![Holiday::new(d(2024, 12, 25), "Christmas Day")],
            peak_seasons: vec![PeakSeason::new(d(2024, 11, 1), d(2024, 12, 31), "Holiday Rush")],
        })
    }

    #[test]
    fn test_not_loaded() {
        let today = d(2024, 2, 2);
        let r = RddCalculator::new().calculate_at(500.0, 300.0, d(2024, 1, 8), today);
        assert_eq!(r.error, Some(CalculationError::DataNotLoaded));
        assert_eq!(r.rdd, today);
    }

    #[test]
    fn test_success_fills_every_field() {
        let calc = RddCalculator::with_snapshot(snapshot());
        let r = calc.calculate(500.0, 300.0, d(2024, 1, 8));
        assert!(r.is_success());
        assert_eq!(r.transit_days, 3);
        assert_eq!(r.rdd, d(2024, 1, 11));
        assert_eq!(r.rdd_display, "Thursday, January 11, 2024");
        assert_eq!(r.load_spread.earliest, d(2024, 1, 3));
        assert_eq!(r.load_spread.latest, d(2024, 1, 9));
        assert_eq!(r.season_status, SeasonStatus::NonPeak);
    }

    #[test]
    fn test_holiday_in_snapshot_is_honoured() {
        // 周日 12-22 + 3 = 周三 12-25 圣诞 → 12-26
        let calc = RddCalculator::with_snapshot(snapshot());
        let r = calc.calculate(500.0, 300.0, d(2024, 12, 22));
        assert_eq!(r.rdd, d(2024, 12, 26));
        assert_eq!(r.season_status, SeasonStatus::PeakSeason);
    }

    #[test]
    fn test_extreme_transit_days_fail_without_panic() {
        for days in [200_000_000, i64::MAX, i64::MIN, -3651] {
            let mut s = (*snapshot()).clone();
            s.times = vec![TransitTimeEntry::new(1, 1, 1, days)];
            let calc = RddCalculator::with_snapshot(Arc::new(s));
            let today = d(2024, 2, 2);

            let r = calc.calculate_at(500.0, 300.0, d(2024, 1, 8), today);
            assert_eq!(r.error, Some(CalculationError::ConfigurationMissing), "days={}", days);
            assert_eq!(r.rdd, today);
        }
    }

    #[test]
    fn test_load_date_at_calendar_limit_is_out_of_range() {
        let calc = RddCalculator::with_snapshot(snapshot());
        let today = d(2024, 2, 2);
        let r = calc.calculate_at(500.0, 300.0, NaiveDate::MAX, today);
        assert_eq!(r.error, Some(CalculationError::OutOfRange));
        assert_eq!(r.rdd, today);
    }

    #[test]
    fn test_configuration_missing_uses_placeholders() {
        let calc = RddCalculator::with_snapshot(snapshot());
        let today = d(2024, 2, 2);
        let r = calc.calculate_at(500.0, 800.0, d(2024, 1, 8), today);
        assert_eq!(r.error, Some(CalculationError::ConfigurationMissing));
        assert_eq!(r.transit_days, 0);
        assert_eq!(r.load_spread.earliest, today);
    }
}
