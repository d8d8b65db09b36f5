// ==========================================
// RDD 交期计算系统 - 日期展示格式
// ==========================================

use chrono::NaiveDate;

/// 展示格式: "Monday, January 8, 2024"
pub fn format_date_for_display(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// 复制格式: "01/08/2024"
pub fn format_date_for_copy(date: NaiveDate) -> String {
    date.format("%m/%d/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_format() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        assert_eq!(format_date_for_display(date), "Monday, January 8, 2024");
        let date = NaiveDate::from_ymd_opt(2024, 11, 28).unwrap();
        assert_eq!(format_date_for_display(date), "Thursday, November 28, 2024");
    }

    #[test]
    fn test_copy_format_pads() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        assert_eq!(format_date_for_copy(date), "01/08/2024");
    }
}
