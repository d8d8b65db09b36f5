// ==========================================
// RDD 交期计算系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod calculation;
pub mod record;
pub mod reference;
pub mod types;

// 重导出核心类型
pub use calculation::{CalculationInput, CalculationResult, LoadSpread};
pub use record::{
    CalculationRecord, CalculationRecordRequest, RecordOutcome, RecordUser, RecordedResult,
    ResultSummary, UsageDetails, UsageLog, ACTION_TYPE_CALCULATION,
};
pub use reference::{
    DistanceBracket, Holiday, PeakSeason, ReferenceSnapshot, TransitTimeEntry, WeightBracket,
};
pub use types::{CalculationError, ReferenceTable, SeasonStatus, ThemeMode};
