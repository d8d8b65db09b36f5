// ==========================================
// RDD 交期计算系统 - 引擎层
// ==========================================
// 职责: 实现交期计算规则,不拼 SQL
// 红线: Engine 只读参考数据快照, 不做 I/O
// ==========================================

pub mod bracket;
pub mod calculator;
pub mod calendar;
pub mod formatting;
pub mod projection;
pub mod validator;

// 重导出核心引擎
pub use bracket::{
    classify_season, find_distance_bracket, find_weight_bracket, resolve_transit_days,
    TransitResolution,
};
pub use calculator::RddCalculator;
pub use calendar::{is_business_day, is_federal_holiday, is_weekend, next_business_day, BusinessCalendar};
pub use formatting::{format_date_for_copy, format_date_for_display};
pub use projection::{calculate_load_spread, calculate_rdd, LOAD_SPREAD_DAYS};
pub use validator::{
    FindingSeverity, ReferenceValidator, ValidationFinding, ValidationReport,
    DEFAULT_GAP_TOLERANCE,
};
