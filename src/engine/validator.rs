// ==========================================
// RDD 交期计算系统 - 参考数据校验
// ==========================================
// 职责: 加载时检查参考数据质量（区间倒置/重叠/间隙、对照缺失/重复、旺季倒置）
// 红线: 校验只给出报告,不改变解析规则（仍按第一条命中）
// ==========================================

use crate::domain::reference::{ReferenceSnapshot, TransitTimeEntry, MAX_TRANSIT_DAYS};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{instrument, warn};

/// 默认间隙容差: 区间通常按整数存储（0–1000, 1001–2000）
pub const DEFAULT_GAP_TOLERANCE: f64 = 1.0;

// ==========================================
// FindingSeverity - 严重级别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingSeverity {
    Warning, // 可运行,但部分输入会失败或结果依赖顺序
    Error,   // 数据自相矛盾
}

impl fmt::Display for FindingSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingSeverity::Warning => write!(f, "WARNING"),
            FindingSeverity::Error => write!(f, "ERROR"),
        }
    }
}

// ==========================================
// ValidationFinding / ValidationReport
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFinding {
    pub severity: FindingSeverity,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub findings: Vec<ValidationFinding>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn error_count(&self) -> usize {
        self.count(FindingSeverity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(FindingSeverity::Warning)
    }

    /// 是否包含指定代码的发现
    pub fn contains(&self, code: &str) -> bool {
        self.findings.iter().any(|f| f.code == code)
    }

    fn count(&self, severity: FindingSeverity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }

    fn push(&mut self, severity: FindingSeverity, code: &str, message: String) {
        self.findings.push(ValidationFinding {
            severity,
            code: code.to_string(),
            message,
        });
    }
}

/// 区间的通用视图（重量/距离共用检查逻辑）
struct RangeView {
    id: i64,
    min: f64,
    max: f64,
}

// ==========================================
// ReferenceValidator - 参考数据校验器
// ==========================================
pub struct ReferenceValidator {
    gap_tolerance: f64,
}

impl Default for ReferenceValidator {
    fn default() -> Self {
        Self::new(DEFAULT_GAP_TOLERANCE)
    }
}

impl ReferenceValidator {
    pub fn new(gap_tolerance: f64) -> Self {
        Self { gap_tolerance }
    }

    /// 校验完整快照
    #[instrument(skip(self, snapshot))]
    pub fn validate(&self, snapshot: &ReferenceSnapshot) -> ValidationReport {
        let mut report = ValidationReport::default();

        let weights: Vec<RangeView> = snapshot
            .weights
            .iter()
            .map(|w| RangeView {
                id: w.id,
                min: w.min_weight,
                max: w.max_weight,
            })
            .collect();
        let distances: Vec<RangeView> = snapshot
            .distances
            .iter()
            .map(|d| RangeView {
                id: d.id,
                min: d.min_distance,
                max: d.max_distance,
            })
            .collect();

        self.check_ranges("WEIGHT", &weights, &mut report);
        self.check_ranges("DISTANCE", &distances, &mut report);
        self.check_transit_times(snapshot, &mut report);
        self.check_calendar(snapshot, &mut report);

        if !report.is_clean() {
            warn!(
                errors = report.error_count(),
                warnings = report.warning_count(),
                "参考数据校验发现问题"
            );
        }
        report
    }

    /// 区间检查: 重复 id、倒置、重叠、间隙
    fn check_ranges(&self, label: &str, ranges: &[RangeView], report: &mut ValidationReport) {
        let mut seen_ids = HashSet::new();
        for r in ranges {
            if !seen_ids.insert(r.id) {
                report.push(
                    FindingSeverity::Error,
                    &format!("{}_DUPLICATE_ID", label),
                    format!("{} bracket id={} appears more than once", label, r.id),
                );
            }
            if r.min > r.max {
                report.push(
                    FindingSeverity::Error,
                    &format!("{}_INVERTED_RANGE", label),
                    format!("{} bracket id={} has min {} > max {}", label, r.id, r.min, r.max),
                );
            }
        }

        let mut sorted: Vec<&RangeView> = ranges.iter().filter(|r| r.min <= r.max).collect();
        sorted.sort_by(|a, b| a.min.total_cmp(&b.min));

        // 与已覆盖的最远上界比较,嵌套区间不会误报间隙
        let mut iter = sorted.into_iter();
        let Some(mut reach) = iter.next() else {
            return;
        };
        for next in iter {
            if next.min <= reach.max {
                report.push(
                    FindingSeverity::Error,
                    &format!("{}_OVERLAP", label),
                    format!(
                        "{} brackets id={} [{}, {}] and id={} [{}, {}] overlap; first match wins",
                        label, reach.id, reach.min, reach.max, next.id, next.min, next.max
                    ),
                );
            } else if next.min - reach.max > self.gap_tolerance {
                report.push(
                    FindingSeverity::Warning,
                    &format!("{}_GAP", label),
                    format!(
                        "{} values between {} and {} match no bracket",
                        label, reach.max, next.min
                    ),
                );
            }
            if next.max > reach.max {
                reach = next;
            }
        }
    }

    /// 运输天数对照检查: 未知区间、重复组合、缺失组合、天数越界
    fn check_transit_times(&self, snapshot: &ReferenceSnapshot, report: &mut ValidationReport) {
        let weight_ids: HashSet<i64> = snapshot.weights.iter().map(|w| w.id).collect();
        let distance_ids: HashSet<i64> = snapshot.distances.iter().map(|d| d.id).collect();
        let mut pairs: HashMap<(i64, i64), usize> = HashMap::new();

        for t in &snapshot.times {
            if !weight_ids.contains(&t.weight_bracket_id) {
                report.push(
                    FindingSeverity::Error,
                    "TRANSIT_UNKNOWN_WEIGHT",
                    format!(
                        "transit entry id={} references unknown weight bracket {}",
                        t.id, t.weight_bracket_id
                    ),
                );
            }
            if !distance_ids.contains(&t.distance_bracket_id) {
                report.push(
                    FindingSeverity::Error,
                    "TRANSIT_UNKNOWN_DISTANCE",
                    format!(
                        "transit entry id={} references unknown distance bracket {}",
                        t.id, t.distance_bracket_id
                    ),
                );
            }
            if !TransitTimeEntry::days_in_range(t.days) {
                report.push(
                    FindingSeverity::Error,
                    "TRANSIT_DAYS_OUT_OF_RANGE",
                    format!(
                        "transit entry id={} has days {} beyond ±{}; calculations for this pair fail",
                        t.id, t.days, MAX_TRANSIT_DAYS
                    ),
                );
            } else if t.days < 0 {
                report.push(
                    FindingSeverity::Warning,
                    "TRANSIT_NEGATIVE_DAYS",
                    format!("transit entry id={} has negative days {}", t.id, t.days),
                );
            }
            *pairs
                .entry((t.weight_bracket_id, t.distance_bracket_id))
                .or_insert(0) += 1;
        }

        let mut duplicates: Vec<_> = pairs.iter().filter(|(_, count)| **count > 1).collect();
        duplicates.sort();
        for ((w, d), count) in duplicates {
            report.push(
                FindingSeverity::Warning,
                "TRANSIT_DUPLICATE_PAIR",
                format!(
                    "weight {} / distance {} has {} transit entries; first match wins",
                    w, d, count
                ),
            );
        }

        for w in &snapshot.weights {
            for d in &snapshot.distances {
                if !pairs.contains_key(&(w.id, d.id)) {
                    report.push(
                        FindingSeverity::Warning,
                        "TRANSIT_MISSING_PAIR",
                        format!("weight {} / distance {} has no transit entry", w.id, d.id),
                    );
                }
            }
        }
    }

    /// 假日/旺季检查
    fn check_calendar(&self, snapshot: &ReferenceSnapshot, report: &mut ValidationReport) {
        let mut seen_dates = HashSet::new();
        for h in &snapshot.holidays {
            if !seen_dates.insert(h.date) {
                report.push(
                    FindingSeverity::Warning,
                    "HOLIDAY_DUPLICATE_DATE",
                    format!("holiday date {} is listed more than once", h.date),
                );
            }
        }

        for s in &snapshot.peak_seasons {
            if s.start_date > s.end_date {
                report.push(
                    FindingSeverity::Error,
                    "SEASON_INVERTED_RANGE",
                    format!(
                        "peak season '{}' starts {} after it ends {}",
                        s.name, s.start_date, s.end_date
                    ),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reference::{
        DistanceBracket, Holiday, PeakSeason, TransitTimeEntry, WeightBracket,
    };
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn clean_snapshot() -> ReferenceSnapshot {
        ReferenceSnapshot {
            weights: vec![
                WeightBracket::new(1, 0.0, 1000.0),
                WeightBracket::new(2, 1001.0, 5000.0),
            ],
            distances: vec![DistanceBracket::new(1, 0.0, 500.0)],
            times: vec![
                TransitTimeEntry::new(1, 1, 1, 3),
                TransitTimeEntry::new(2, 2, 1, 4),
            ],
            holidays: vec![Holiday::new(d(2024, 7, 4), "Independence Day")],
            peak_seasons: vec![PeakSeason::new(d(2024, 5, 15), d(2024, 9, 30), "Summer")],
        }
    }

    #[test]
    fn test_clean_snapshot_has_no_findings() {
        let report = ReferenceValidator::default().validate(&clean_snapshot());
        assert!(report.is_clean(), "{:?}", report.findings);
    }

    #[test]
    fn test_nested_brackets_compare_against_widest_reach() {
        let mut s = clean_snapshot();
        s.weights = vec![
            WeightBracket::new(1, 0.0, 5000.0),
            WeightBracket::new(2, 100.0, 200.0),
            WeightBracket::new(3, 300.0, 400.0),
        ];
        let report = ReferenceValidator::default().validate(&s);

        // 250 仍落在 id=1 内
        assert!(!report.contains("WEIGHT_GAP"), "{:?}", report.findings);
        let overlaps: Vec<_> = report
            .findings
            .iter()
            .filter(|f| f.code == "WEIGHT_OVERLAP")
            .collect();
        assert_eq!(overlaps.len(), 2);
        assert!(overlaps.iter().any(|f| f.message.contains("id=3")));
    }

    #[test]
    fn test_gap_after_nested_bracket_uses_outer_max() {
        let mut s = clean_snapshot();
        s.weights = vec![
            WeightBracket::new(1, 0.0, 1000.0),
            WeightBracket::new(2, 100.0, 200.0),
            WeightBracket::new(3, 1001.0, 2000.0),
        ];
        let report = ReferenceValidator::default().validate(&s);
        // 1000 → 1001 在容差内
        assert!(!report.contains("WEIGHT_GAP"), "{:?}", report.findings);
    }

    #[test]
    fn test_transit_days_beyond_limit_flagged() {
        let mut s = clean_snapshot();
        s.times[0].days = 200_000_000;
        let report = ReferenceValidator::default().validate(&s);
        assert!(report.contains("TRANSIT_DAYS_OUT_OF_RANGE"));
        assert!(!report.contains("TRANSIT_NEGATIVE_DAYS"));
        assert!(report.has_errors());
    }

    #[test]
    fn test_overlap_and_gap_detected() {
        let mut s = clean_snapshot();
        s.weights = vec![
            WeightBracket::new(1, 0.0, 1000.0),
            WeightBracket::new(2, 900.0, 2000.0),
            WeightBracket::new(3, 2500.0, 3000.0),
        ];
        let report = ReferenceValidator::default().validate(&s);
        assert!(report.contains("WEIGHT_OVERLAP"));
        assert!(report.contains("WEIGHT_GAP"));
        assert!(report.has_errors());
    }

    #[test]
    fn test_inverted_ranges_detected() {
        let mut s = clean_snapshot();
        s.distances.push(DistanceBracket::new(2, 900.0, 600.0));
        s.peak_seasons.push(PeakSeason::new(d(2024, 12, 31), d(2024, 11, 1), "Backwards"));
        let report = ReferenceValidator::default().validate(&s);
        assert!(report.contains("DISTANCE_INVERTED_RANGE"));
        assert!(report.contains("SEASON_INVERTED_RANGE"));
    }

    #[test]
    fn test_transit_table_problems_detected() {
        let mut s = clean_snapshot();
        s.times = vec![
            TransitTimeEntry::new(1, 1, 1, 3),
            TransitTimeEntry::new(2, 1, 1, 5),
            TransitTimeEntry::new(3, 9, 1, -1),
        ];
        let report = ReferenceValidator::default().validate(&s);
        assert!(report.contains("TRANSIT_DUPLICATE_PAIR"));
        assert!(report.contains("TRANSIT_UNKNOWN_WEIGHT"));
        assert!(report.contains("TRANSIT_NEGATIVE_DAYS"));
        // 区间 2 / 距离 1 无对照
        assert!(report.contains("TRANSIT_MISSING_PAIR"));
    }

    #[test]
    fn test_duplicate_holiday_is_warning() {
        let mut s = clean_snapshot();
        s.holidays.push(Holiday::new(d(2024, 7, 4), "Independence Day (observed)"));
        let report = ReferenceValidator::default().validate(&s);
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.warning_count(), 1);
        assert!(report.contains("HOLIDAY_DUPLICATE_DATE"));
    }
}
