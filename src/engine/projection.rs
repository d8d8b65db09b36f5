// ==========================================
// RDD 交期计算系统 - 交期推算与装车窗口
// ==========================================
// 职责:
// - RDD 推算: 起始日 + 运输日历天数,再顺延到工作日
// - 装车窗口: 以计划装车日为基准的 7 日日历窗口
// ==========================================

use crate::domain::calculation::LoadSpread;
use crate::domain::reference::Holiday;
use crate::engine::calendar::BusinessCalendar;
use chrono::{Duration, NaiveDate};

/// 装车窗口宽度（日历日,含首尾）
pub const LOAD_SPREAD_DAYS: i64 = 7;

/// 推算 RDD
///
/// 运输天数按日历日累加（不是工作日）,结果落在周末/假日时向后顺延。
/// `transit_days` 为 0 时即当天（仍需顺延）;负数不做校验,按同样规则计算。
///
/// 结果超出 chrono 可表示范围时返回 None
pub fn calculate_rdd(
    start_date: NaiveDate,
    transit_days: i64,
    holidays: &[Holiday],
) -> Option<NaiveDate> {
    BusinessCalendar::new(holidays).project_rdd(start_date, transit_days)
}

/// 计算装车窗口
///
/// latest = 装车日 + 1; earliest = latest - 6。
/// 不做工作日调整。装车日位于可表示范围边缘时返回 None。
pub fn calculate_load_spread(load_date: NaiveDate) -> Option<LoadSpread> {
    let latest = load_date.succ_opt()?;
    let earliest = latest.checked_sub_signed(Duration::try_days(LOAD_SPREAD_DAYS - 1)?)?;
    Some(LoadSpread { earliest, latest })
}

impl BusinessCalendar {
    /// 基于本日历推算 RDD（避免每次重建假日集合）
    pub fn project_rdd(&self, start_date: NaiveDate, transit_days: i64) -> Option<NaiveDate> {
        let naive_rdd = start_date.checked_add_signed(Duration::try_days(transit_days)?)?;
        let rdd = self.next_business_day(naive_rdd);
        // 顺延撞到 NaiveDate::MAX 时不是工作日
        self.is_business_day(rdd).then_some(rdd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::calendar::is_business_day;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_rdd_plain_weekday() {
        // 周一 + 3 天 = 周四
        assert_eq!(calculate_rdd(d(2024, 1, 8), 3, &[]), Some(d(2024, 1, 11)));
    }

    #[test]
    fn test_rdd_snaps_past_weekend() {
        // 周四 + 3 天 = 周日 → 周一
        assert_eq!(calculate_rdd(d(2024, 1, 11), 3, &[]), Some(d(2024, 1, 15)));
    }

    #[test]
    fn test_rdd_snaps_past_weekend_and_holiday() {
        let holidays = vec![Holiday::new(d(2024, 1, 15), "Martin Luther King Jr. Day")];
        assert_eq!(calculate_rdd(d(2024, 1, 11), 3, &holidays), Some(d(2024, 1, 16)));
    }

    #[test]
    fn test_rdd_zero_days() {
        assert_eq!(calculate_rdd(d(2024, 1, 8), 0, &[]), Some(d(2024, 1, 8)));
        // 周六装车、0 天 → 周一
        assert_eq!(calculate_rdd(d(2024, 1, 6), 0, &[]), Some(d(2024, 1, 8)));
    }

    #[test]
    fn test_rdd_negative_days_follow_calendar_arithmetic() {
        // 周一 - 2 天 = 周六 → 顺延到周一（即起始日）
        assert_eq!(calculate_rdd(d(2024, 1, 8), -2, &[]), Some(d(2024, 1, 8)));
        // 周三 - 1 天 = 周二
        assert_eq!(calculate_rdd(d(2024, 1, 10), -1, &[]), Some(d(2024, 1, 9)));
    }

    #[test]
    fn test_rdd_is_always_business_day() {
        let holidays = vec![
            Holiday::new(d(2024, 7, 4), "Independence Day"),
            Holiday::new(d(2024, 9, 2), "Labor Day"),
        ];
        let start = d(2024, 6, 1);
        for offset in 0..120 {
            let load = start + Duration::days(offset);
            for days in 0..15 {
                let rdd = calculate_rdd(load, days, &holidays).unwrap();
                assert!(is_business_day(rdd, &holidays), "load={} days={}", load, days);
            }
        }
    }

    #[test]
    fn test_load_spread_window() {
        let spread = calculate_load_spread(d(2024, 1, 8)).unwrap();
        assert_eq!(spread.latest, d(2024, 1, 9));
        assert_eq!(spread.earliest, d(2024, 1, 3));
    }

    #[test]
    fn test_load_spread_width_is_constant() {
        let start = d(2023, 12, 1);
        for offset in 0..400 {
            let load = start + Duration::days(offset);
            let spread = calculate_load_spread(load).unwrap();
            // 含首尾共 7 个日历日
            assert_eq!((spread.latest - spread.earliest).num_days() + 1, LOAD_SPREAD_DAYS);
            assert_eq!(spread.latest, load + Duration::days(1));
        }
    }

    #[test]
    fn test_rdd_beyond_representable_range_is_none() {
        assert_eq!(calculate_rdd(d(2024, 1, 8), 200_000_000, &[]), None);
        assert_eq!(calculate_rdd(d(2024, 1, 8), i64::MAX, &[]), None);
        assert_eq!(calculate_rdd(d(2024, 1, 8), i64::MIN, &[]), None);
        assert_eq!(calculate_rdd(NaiveDate::MAX, 1, &[]), None);
    }

    #[test]
    fn test_load_spread_at_max_date_is_none() {
        assert_eq!(calculate_load_spread(NaiveDate::MAX), None);
        assert!(calculate_load_spread(NaiveDate::MIN).is_none());
    }

    #[test]
    fn test_load_spread_crosses_year_boundary() {
        let spread = calculate_load_spread(d(2024, 1, 2)).unwrap();
        assert_eq!(spread.earliest, d(2023, 12, 28));
        assert_eq!(spread.latest, d(2024, 1, 3));
    }
}
