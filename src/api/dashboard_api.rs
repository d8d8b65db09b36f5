// ==========================================
// RDD 交期计算系统 - 使用统计 API
// ==========================================
// 职责: 聚合计算记录/使用日志,提供统计面板数据
// 架构: API 层 → CalculationRecordRepository
// 窗口: 本周 = [now-7d, now], 上周 = [now-14d, now-7d)
// ==========================================

use crate::api::error::ApiResult;
use crate::config::app_settings::DEFAULT_LOCALE;
use crate::domain::record::{CalculationRecord, UsageLog, ACTION_TYPE_CALCULATION};
use crate::i18n::{t_for, t_with_args};
use crate::repository::calculation_record_repo::CalculationRecordRepository;
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// 最近记录条数
pub const RECENT_LIMIT: usize = 5;
/// 路线统计取样条数
pub const ROUTE_SAMPLE_LIMIT: usize = 100;
/// 热门路线条数
pub const TOP_ROUTE_LIMIT: usize = 5;

// ==========================================
// 响应类型
// ==========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteCount {
    pub route: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// 计算次数（使用日志中 action_type = calculation）
    pub calc_count: i64,
    /// 全部使用日志条数
    pub log_count: i64,
    /// 已保存的成功计算记录数
    pub saved_calc_count: i64,
    pub this_week_calcs: i64,
    pub last_week_calcs: i64,
    /// 例: "+3 this week" / "-2 this week"
    pub weekly_trend: String,
    pub recent_calculations: Vec<CalculationRecord>,
    pub recent_logs: Vec<UsageLog>,
    pub top_routes: Vec<RouteCount>,
    pub unique_route_count: usize,
    /// 近 7 天计算时间点（升序）
    pub calculation_event_timestamps: Vec<NaiveDateTime>,
}

// ==========================================
// DashboardApi
// ==========================================
pub struct DashboardApi {
    record_repo: Arc<CalculationRecordRepository>,
    locale: String,
}

impl DashboardApi {
    pub fn new(record_repo: Arc<CalculationRecordRepository>) -> Self {
        Self {
            record_repo,
            locale: DEFAULT_LOCALE.to_string(),
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// 统计面板汇总
    ///
    /// # 参数
    /// - now: 统计基准时间（本地时间）
    #[instrument(skip(self))]
    pub fn get_dashboard_summary(&self, now: NaiveDateTime) -> ApiResult<DashboardSummary> {
        let week_ago = now - Duration::days(7);
        let two_weeks_ago = now - Duration::days(14);

        let calc_count = self
            .record_repo
            .count_usage_logs(Some(ACTION_TYPE_CALCULATION))?;
        let log_count = self.record_repo.count_usage_logs(None)?;
        let saved_calc_count = self.record_repo.count_calculations()?;

        let this_week_calcs =
            self.record_repo
                .count_usage_logs_between(ACTION_TYPE_CALCULATION, week_ago, None)?;
        let last_week_calcs = self.record_repo.count_usage_logs_between(
            ACTION_TYPE_CALCULATION,
            two_weeks_ago,
            Some(week_ago),
        )?;

        let recent_calculations = self.record_repo.list_recent_calculations(RECENT_LIMIT)?;
        let recent_logs = self.record_repo.list_recent_usage_logs(RECENT_LIMIT)?;

        let names = self.record_repo.list_calculation_names(ROUTE_SAMPLE_LIMIT)?;
        let unknown = t_for(&self.locale, "dashboard.unknown_route");
        let all_routes = rank_routes(names, &unknown);
        let unique_route_count = all_routes.len();
        let top_routes = all_routes.into_iter().take(TOP_ROUTE_LIMIT).collect();

        let calculation_event_timestamps = self
            .record_repo
            .list_usage_log_times_since(ACTION_TYPE_CALCULATION, week_ago)?;

        debug!(calc_count, log_count, this_week_calcs, last_week_calcs, "统计面板汇总完成");

        Ok(DashboardSummary {
            calc_count,
            log_count,
            saved_calc_count,
            this_week_calcs,
            last_week_calcs,
            weekly_trend: self.weekly_trend(this_week_calcs - last_week_calcs),
            recent_calculations,
            recent_logs,
            top_routes,
            unique_route_count,
            calculation_event_timestamps,
        })
    }

    fn weekly_trend(&self, change: i64) -> String {
        let change = if change >= 0 {
            format!("+{}", change)
        } else {
            change.to_string()
        };
        t_with_args(&self.locale, "dashboard.weekly_trend", &[("change", &change)])
    }
}

/// 按名称计数并降序排列; 计数相同保持首次出现顺序
fn rank_routes(names: Vec<Option<String>>, unknown: &str) -> Vec<RouteCount> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for name in names {
        let route = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| unknown.to_string());
        let entry = counts.entry(route.clone()).or_insert(0);
        if *entry == 0 {
            order.push(route);
        }
        *entry += 1;
    }

    let mut ranked: Vec<RouteCount> = order
        .into_iter()
        .map(|route| {
            let count = counts.get(&route).copied().unwrap_or(0);
            RouteCount { route, count }
        })
        .collect();
    // sort_by 为稳定排序
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_routes_ties_keep_first_seen() {
        let names = vec![
            Some("Chicago".to_string()),
            None,
            Some("Denver".to_string()),
            Some("Denver".to_string()),
            Some("".to_string()),
            Some("Chicago".to_string()),
            Some("Austin".to_string()),
        ];
        let ranked = rank_routes(names, "Unknown Route");
        assert_eq!(ranked.len(), 4);
        assert_eq!(ranked[0], RouteCount { route: "Chicago".into(), count: 2 });
        assert_eq!(ranked[1].route, "Unknown Route");
        assert_eq!(ranked[1].count, 2);
        assert_eq!(ranked[2].route, "Denver");
        assert_eq!(ranked[3], RouteCount { route: "Austin".into(), count: 1 });
    }

    #[test]
    fn test_rank_routes_empty() {
        assert!(rank_routes(Vec::new(), "Unknown Route").is_empty());
    }
}
