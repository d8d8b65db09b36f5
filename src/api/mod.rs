// ==========================================
// RDD 交期计算系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供 CLI 及宿主界面调用
// ==========================================

pub mod calculator_api;
pub mod dashboard_api;
pub mod error;
pub mod reference_data_api;

// 重导出核心类型
pub use calculator_api::{CalculationResponse, CalculatorApi, RecordResponse, ReloadSummary};
pub use dashboard_api::{DashboardApi, DashboardSummary, RouteCount};
pub use error::{ApiError, ApiResult};
pub use reference_data_api::ReferenceDataApi;
