// ==========================================
// RDD 交期计算系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 说明: 所有仓储共享同一个数据库连接; 界面设置在启动时读取一次并注入
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{CalculatorApi, DashboardApi, ReferenceDataApi};
use crate::config::app_settings::AppSettings;
use crate::config::config_manager::ConfigManager;
use crate::db::open_sqlite_connection;
use crate::loader::ReferenceDataLoader;
use crate::repository::{
    calculation_record_repo::CalculationRecordRepository, reference_repo::ReferenceDataRepository,
};

/// 应用状态
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 当前界面设置
    pub settings: AppSettings,

    /// 计算API
    pub calculator_api: Arc<CalculatorApi>,

    /// 统计面板API
    pub dashboard_api: Arc<DashboardApi>,

    /// 参考数据管理API
    pub reference_data_api: Arc<ReferenceDataApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例（参考数据尚未加载）
    /// - Err(String): 初始化错误
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState,数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // Repository（首个仓储负责建表）
        // ==========================================
        let reference_repo = Arc::new(
            ReferenceDataRepository::from_connection(conn.clone())
                .map_err(|e| format!("无法初始化ReferenceDataRepository: {}", e))?,
        );
        let record_repo = Arc::new(
            CalculationRecordRepository::from_connection(conn.clone())
                .map_err(|e| format!("无法初始化CalculationRecordRepository: {}", e))?,
        );

        // ==========================================
        // 配置
        // ==========================================
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法初始化ConfigManager: {}", e))?,
        );
        let settings = config_manager
            .load_app_settings()
            .map_err(|e| format!("无法读取界面设置: {}", e))?;
        let policy = config_manager
            .loader_policy()
            .map_err(|e| format!("无法读取加载策略: {}", e))?;
        let name_max_len = config_manager
            .calculation_name_max_len()
            .map_err(|e| format!("无法读取名称长度配置: {}", e))?;

        // ==========================================
        // API
        // ==========================================
        let loader = Arc::new(ReferenceDataLoader::new(reference_repo.clone(), policy));
        let calculator_api = Arc::new(
            CalculatorApi::new(loader, record_repo.clone(), settings.clone())
                .with_name_max_len(name_max_len),
        );
        let dashboard_api =
            Arc::new(DashboardApi::new(record_repo).with_locale(settings.locale.clone()));
        let reference_data_api = Arc::new(ReferenceDataApi::new(reference_repo));

        tracing::info!(locale = %settings.locale, "AppState初始化完成");

        Ok(Self {
            db_path,
            settings,
            calculator_api,
            dashboard_api,
            reference_data_api,
            config_manager,
        })
    }
}

/// 默认数据库路径
///
/// 优先使用环境变量 RDD_CALCULATOR_DB_PATH,否则放在用户数据目录下
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("RDD_CALCULATOR_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./rdd_calculator.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("rdd-calculator");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("rdd_calculator.db");
        }
    }

    path.to_string_lossy().to_string()
}
