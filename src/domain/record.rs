// ==========================================
// RDD 交期计算系统 - 计算记录领域模型
// ==========================================
// 职责: 计算尝试的持久化形态（用于使用统计与复现）
// 红线: 载荷为强类型 + 标签化结果,边界处拒绝畸形数据,不静默置空
// ==========================================

use crate::domain::calculation::{CalculationInput, CalculationResult, LoadSpread};
use crate::domain::types::{CalculationError, SeasonStatus};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// usage_logs.action_type: 计算
pub const ACTION_TYPE_CALCULATION: &str = "calculation";

// ==========================================
// RecordUser - 发起计算的用户（匿名时为空）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordUser {
    pub id: String,
    pub email: Option<String>,
}

// ==========================================
// RecordedResult - 成功结果的存储形态
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedResult {
    pub transit_days: i64,
    pub rdd_display: String,
    pub rdd: NaiveDate,
    pub season_status: SeasonStatus,
    pub load_spread: LoadSpread,
}

// ==========================================
// RecordOutcome - 标签化计算结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordOutcome {
    Success(RecordedResult),
    Failure { error: CalculationError },
}

impl RecordOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RecordOutcome::Success(_))
    }
}

impl From<&CalculationResult> for RecordOutcome {
    fn from(result: &CalculationResult) -> Self {
        match result.error {
            Some(error) => RecordOutcome::Failure { error },
            None => RecordOutcome::Success(RecordedResult {
                transit_days: result.transit_days,
                rdd_display: result.rdd_display.clone(),
                rdd: result.rdd,
                season_status: result.season_status,
                load_spread: result.load_spread,
            }),
        }
    }
}

// ==========================================
// CalculationRecordRequest - 记录请求
// ==========================================
/// 记录一次计算尝试的请求（边界载荷）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CalculationRecordRequest {
    #[serde(default)]
    pub calculation_name: Option<String>,
    #[serde(default)]
    pub user: Option<RecordUser>,
    pub input: CalculationInput,
    pub outcome: RecordOutcome,
}

impl CalculationRecordRequest {
    pub fn new(input: CalculationInput, result: &CalculationResult) -> Self {
        Self {
            calculation_name: None,
            user: None,
            input,
            outcome: RecordOutcome::from(result),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.calculation_name = Some(name.into());
        self
    }

    pub fn with_user(mut self, user: RecordUser) -> Self {
        self.user = Some(user);
        self
    }
}

// ==========================================
// ResultSummary / UsageDetails - 使用日志明细
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResultSummary {
    #[serde(rename_all = "camelCase")]
    Success {
        transit_days: i64,
        season_status: SeasonStatus,
        rdd: NaiveDate,
    },
    Failure { error: CalculationError },
}

impl From<&RecordOutcome> for ResultSummary {
    fn from(outcome: &RecordOutcome) -> Self {
        match outcome {
            RecordOutcome::Success(r) => ResultSummary::Success {
                transit_days: r.transit_days,
                season_status: r.season_status,
                rdd: r.rdd,
            },
            RecordOutcome::Failure { error } => ResultSummary::Failure { error: *error },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageDetails {
    pub authenticated: bool,
    pub user_email: Option<String>,
    pub successful: bool,
    pub name: Option<String>,
    pub input_data: CalculationInput,
    pub result_summary: ResultSummary,
}

// ==========================================
// 存储行
// ==========================================

/// calculations 表行（仅成功计算）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRecord {
    pub id: String,
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub input_data: CalculationInput,
    pub result_data: RecordedResult,
    pub created_at: NaiveDateTime,
}

/// usage_logs 表行（所有动作）
///
/// details 按动作类型不同而结构不同,读取时保留为 JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageLog {
    pub id: String,
    pub user_id: Option<String>,
    pub action_type: String,
    pub details: serde_json::Value,
    pub created_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_outcome_from_failed_result() {
        let result = CalculationResult::failure(CalculationError::OutOfRange, d(2024, 1, 1));
        let outcome = RecordOutcome::from(&result);
        assert_eq!(
            outcome,
            RecordOutcome::Failure {
                error: CalculationError::OutOfRange
            }
        );
        let v = serde_json::to_value(&outcome).unwrap();
        assert_eq!(v["status"], "failure");
        assert_eq!(v["error"], "OUT_OF_RANGE");
    }

    #[test]
    fn test_request_rejects_malformed_outcome() {
        let bad = r#"{
            "input": {"weight": 500, "distance": 300, "loadDate": "2024-01-08"},
            "outcome": {"status": "success", "transitDays": "three"}
        }"#;
        assert!(serde_json::from_str::<CalculationRecordRequest>(bad).is_err());

        let unknown_field = r#"{
            "input": {"weight": 500, "distance": 300, "loadDate": "2024-01-08"},
            "outcome": {"status": "failure", "error": "OUT_OF_RANGE"},
            "extra": true
        }"#;
        assert!(serde_json::from_str::<CalculationRecordRequest>(unknown_field).is_err());
    }

    #[test]
    fn test_request_accepts_success_payload() {
        let ok = r#"{
            "calculationName": "Chicago move",
            "input": {"weight": 500, "distance": 300, "loadDate": "2024-01-08", "packDate": "2024-01-05"},
            "outcome": {
                "status": "success",
                "transitDays": 3,
                "rddDisplay": "Thursday, January 11, 2024",
                "rdd": "2024-01-11",
                "seasonStatus": "Non-Peak",
                "loadSpread": {"earliest": "2024-01-03", "latest": "2024-01-09"}
            }
        }"#;
        let req: CalculationRecordRequest = serde_json::from_str(ok).unwrap();
        assert!(req.outcome.is_success());
        assert_eq!(req.input.pack_date, Some(d(2024, 1, 5)));
    }
}
