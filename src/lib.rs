// ==========================================
// RDD 交期计算系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 按货物重量/运输距离/装车日期计算要求交货日期 (RDD)
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 计算规则
pub mod engine;

// 导入层 - 参考数据文件
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// 参考数据加载（超时 + 重试）
pub mod loader;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CalculationError, ReferenceTable, SeasonStatus, ThemeMode};

// 领域实体
pub use domain::{
    CalculationInput, CalculationResult, DistanceBracket, Holiday, LoadSpread, PeakSeason,
    ReferenceSnapshot, TransitTimeEntry, WeightBracket,
};

// 引擎
pub use engine::{RddCalculator, ReferenceValidator};

// API
pub use api::{CalculatorApi, DashboardApi, ReferenceDataApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "RDD 交期计算系统";
