// ==========================================
// RDD 交期计算系统 - 工作日历引擎
// ==========================================
// 职责: 判定工作日（非周末、非联邦假日）,向后顺延到下一个工作日
// 约定: 假日匹配基于本地日历日期,与 YYYY-MM-DD 字符串比较等价
// ==========================================

use crate::domain::reference::Holiday;
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::HashSet;

// ==========================================
// BusinessCalendar - 工作日历
// ==========================================
/// 基于假日集合的工作日历
///
/// 构造时将假日列表转为集合,单次判定为 O(1)
#[derive(Debug, Clone, Default)]
pub struct BusinessCalendar {
    holidays: HashSet<NaiveDate>,
}

impl BusinessCalendar {
    /// 从假日列表构建工作日历
    pub fn new(holidays: &[Holiday]) -> Self {
        Self {
            holidays: holidays.iter().map(|h| h.date).collect(),
        }
    }

    /// 假日数量（去重后）
    pub fn holiday_count(&self) -> usize {
        self.holidays.len()
    }

    /// 是否为联邦假日
    pub fn is_federal_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    /// 是否为工作日
    ///
    /// # 返回
    /// - `false`: 周六/周日
    /// - `false`: 联邦假日
    /// - `true`: 其他
    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        if is_weekend(date) {
            return false;
        }
        !self.is_federal_holiday(date)
    }

    /// 顺延到下一个工作日（当天是工作日则原样返回）
    ///
    /// 假日集合有限,循环必然终止
    pub fn next_business_day(&self, date: NaiveDate) -> NaiveDate {
        let mut result = date;
        while !self.is_business_day(result) {
            match result.succ_opt() {
                Some(next) => result = next,
                None => break,
            }
        }
        result
    }
}

/// 是否为周末（周六/周日）
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

// ==========================================
// 函数式入口（直接基于假日列表）
// ==========================================

/// 日期是否与任一假日的日期相同
pub fn is_federal_holiday(date: NaiveDate, holidays: &[Holiday]) -> bool {
    holidays.iter().any(|h| h.date == date)
}

/// 是否为工作日（非周末、非假日）
pub fn is_business_day(date: NaiveDate, holidays: &[Holiday]) -> bool {
    if is_weekend(date) {
        return false;
    }
    !is_federal_holiday(date, holidays)
}

/// 顺延到下一个工作日
pub fn next_business_day(date: NaiveDate, holidays: &[Holiday]) -> NaiveDate {
    BusinessCalendar::new(holidays).next_business_day(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn every_day_of(year: i32) -> impl Iterator<Item = NaiveDate> {
        let start = d(year, 1, 1);
        let end = d(year, 12, 31);
        start.iter_days().take_while(move |x| *x <= end)
    }

    #[test]
    fn test_without_holidays_only_weekends_are_closed() {
        for date in every_day_of(2024) {
            let weekday = date.weekday();
            let expected = weekday != Weekday::Sat && weekday != Weekday::Sun;
            assert_eq!(is_business_day(date, &[]), expected, "date={}", date);
        }
    }

    #[test]
    fn test_holiday_is_never_business_day() {
        let holidays: Vec<Holiday> = every_day_of(2024)
            .step_by(11)
            .map(|date| Holiday::new(date, "test"))
            .collect();

        for h in &holidays {
            assert!(!is_business_day(h.date, &holidays), "date={}", h.date);
            assert!(is_federal_holiday(h.date, &holidays));
        }
    }

    #[test]
    fn test_next_business_day_always_lands_on_business_day() {
        let holidays = vec![
            Holiday::new(d(2024, 1, 1), "New Year's Day"),
            Holiday::new(d(2024, 1, 15), "Martin Luther King Jr. Day"),
            Holiday::new(d(2024, 5, 27), "Memorial Day"),
            Holiday::new(d(2024, 7, 4), "Independence Day"),
            Holiday::new(d(2024, 11, 28), "Thanksgiving Day"),
            Holiday::new(d(2024, 12, 25), "Christmas Day"),
        ];
        let calendar = BusinessCalendar::new(&holidays);

        for date in every_day_of(2024) {
            let next = calendar.next_business_day(date);
            assert!(calendar.is_business_day(next), "date={} next={}", date, next);
            assert!(next >= date);
        }
    }

    #[test]
    fn test_next_business_day_without_holidays_moves_at_most_two_days() {
        for date in every_day_of(2024) {
            let next = next_business_day(date, &[]);
            if is_weekend(date) {
                assert!(next > date);
                assert!(next - date <= Duration::days(2));
                assert_eq!(next.weekday(), Weekday::Mon);
            } else {
                assert_eq!(next, date);
            }
        }
    }

    #[test]
    fn test_holiday_after_weekend_is_skipped() {
        // 2024-01-13 周六 → 周一 01-15 为 MLK Day → 周二 01-16
        let holidays = vec![Holiday::new(d(2024, 1, 15), "Martin Luther King Jr. Day")];
        assert_eq!(next_business_day(d(2024, 1, 13), &holidays), d(2024, 1, 16));
    }

    #[test]
    fn test_calendar_deduplicates_holidays() {
        let holidays = vec![
            Holiday::new(d(2024, 7, 4), "Independence Day"),
            Holiday::new(d(2024, 7, 4), "Independence Day (dup)"),
        ];
        assert_eq!(BusinessCalendar::new(&holidays).holiday_count(), 1);
    }
}
