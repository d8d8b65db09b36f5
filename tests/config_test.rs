// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: 配置读写、快照恢复、启动期注入
// ==========================================


use rdd_calculator::app::AppState;
use rdd_calculator::config::{config_keys, AppSettings, CalculatorConfigReader, ConfigManager};
use rdd_calculator::domain::types::ThemeMode;
use test_helpers::create_test_db;

#[tokio::test]
async fn test_config_manager_creation() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");

    let config_manager = ConfigManager::new(&db_path);
    assert!(
        config_manager.is_ok(),
        "ConfigManager should be created successfully"
    );
}

#[tokio::test]
async fn test_reader_defaults_on_empty_config() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).unwrap();

    let policy = config_manager.get_loader_policy().await.unwrap();
    assert_eq!(policy.max_retries, 3);
    assert_eq!(policy.retry_base_ms, 300);
    assert_eq!(policy.timeout_ms, 12_000);

    assert_eq!(config_manager.get_calculation_name_max_len().await.unwrap(), 120);
    assert_eq!(
        config_manager.get_app_settings().await.unwrap(),
        AppSettings::default()
    );
}

#[tokio::test]
async fn test_app_settings_round_trip_through_config() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).unwrap();

    let settings = AppSettings {
        theme_mode: ThemeMode::Fallout,
        sound_enabled: false,
        animation_enabled: true,
        locale: "zh-CN".to_string(),
    };
    config_manager.save_app_settings(&settings).unwrap();

    assert_eq!(config_manager.load_app_settings().unwrap(), settings);
    assert_eq!(config_manager.get_locale().await.unwrap(), "zh-CN");
    assert!(!config_manager.get_sound_enabled().await.unwrap());
}

#[tokio::test]
async fn test_invalid_values_fall_back_to_defaults() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).unwrap();

    config_manager
        .set_config_value(config_keys::LOADER_TIMEOUT_MS, "soon")
        .unwrap();
    config_manager.set_config_value(config_keys::LOCALE, "fr").unwrap();
    config_manager
        .set_config_value(config_keys::THEME_MODE, "vaporwave")
        .unwrap();

    assert_eq!(config_manager.get_loader_timeout_ms().await.unwrap(), 12_000);
    assert_eq!(config_manager.get_locale().await.unwrap(), "en");
    assert_eq!(
        config_manager.get_theme_mode().await.unwrap(),
        ThemeMode::default()
    );
}

#[tokio::test]
async fn test_snapshot_and_restore() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).unwrap();

    config_manager
        .set_config_value(config_keys::LOADER_MAX_RETRIES, "5")
        .unwrap();
    let snapshot = config_manager.get_config_snapshot().unwrap();

    config_manager
        .set_config_value(config_keys::LOADER_MAX_RETRIES, "1")
        .unwrap();
    let restored = config_manager.restore_config_from_snapshot(&snapshot).unwrap();
    assert_eq!(restored, 1);
    assert_eq!(config_manager.get_loader_max_retries().await.unwrap(), 5);
}

#[test]
fn test_app_state_injects_configured_values() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    {
        let config_manager = ConfigManager::new(&db_path).unwrap();
        config_manager.set_config_value(config_keys::LOCALE, "zh-CN").unwrap();
        config_manager
            .set_config_value(config_keys::THEME_MODE, "chicago95")
            .unwrap();
    }

    let state = AppState::new(db_path).expect("AppState should initialise");
    assert_eq!(state.settings.locale, "zh-CN");
    assert_eq!(state.settings.theme_mode, ThemeMode::Chicago95);
    assert_eq!(state.calculator_api.settings().locale, "zh-CN");
}
