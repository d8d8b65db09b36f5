// ==========================================
// RDD 交期计算系统 - 配置层
// ==========================================
// 职责: 系统配置管理
// 存储: config_kv 表
// ==========================================

pub mod app_settings;
pub mod calculator_config_trait;
pub mod config_manager;

// 重导出核心配置管理器
pub use app_settings::AppSettings;
pub use calculator_config_trait::{CalculatorConfigReader, ConfigResult};
pub use config_manager::{config_keys, ConfigManager, DEFAULT_CALCULATION_NAME_MAX_LEN};
