// ==========================================
// 参考数据加载器集成测试
// ==========================================
// 测试目标: 配置驱动的加载策略、数据库数据源、失败保留旧快照
// ==========================================


use async_trait::async_trait;
use rdd_calculator::api::CalculatorApi;
use rdd_calculator::config::{config_keys, AppSettings, CalculatorConfigReader, ConfigManager};
use rdd_calculator::domain::reference::ReferenceSnapshot;
use rdd_calculator::loader::{LoaderPolicy, ReferenceDataLoader, ReferenceDataSource};
use rdd_calculator::repository::{CalculationRecordRepository, ReferenceDataRepository};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use test_helpers::{create_test_db, d, seed_reference_data, standard_snapshot};

struct BrokenSource {
    calls: AtomicU32,
}

#[async_trait]
impl ReferenceDataSource for BrokenSource {
    async fn fetch_snapshot(&self) -> anyhow::Result<ReferenceSnapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("database unavailable")
    }
}

#[tokio::test]
async fn test_policy_from_config_drives_loader() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).unwrap();
    config_manager
        .set_config_value(config_keys::LOADER_MAX_RETRIES, "1")
        .unwrap();
    config_manager
        .set_config_value(config_keys::LOADER_RETRY_BASE_MS, "5")
        .unwrap();

    let policy = config_manager.get_loader_policy().await.unwrap();
    assert_eq!(policy.max_retries, 1);
    assert_eq!(policy.retry_base_ms, 5);
    assert_eq!(policy.timeout_ms, 12_000);

    let source = Arc::new(BrokenSource {
        calls: AtomicU32::new(0),
    });
    let loader = ReferenceDataLoader::new(source.clone(), policy);
    assert!(loader.load().await.is_err());
    // 首次 + 1 次重试
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_repository_source_loads_snapshot() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = Arc::new(ReferenceDataRepository::new(&db_path).unwrap());
    seed_reference_data(&repo).unwrap();

    let loader = ReferenceDataLoader::new(repo, LoaderPolicy::default());
    let loaded = loader.load().await.unwrap();
    assert_eq!(loaded.snapshot.weights.len(), 2);
    assert_eq!(loaded.snapshot.times.len(), 3);

    assert!(!loaded.report.has_errors());
    assert!(loaded.report.contains("TRANSIT_MISSING_PAIR"));
}

#[tokio::test]
async fn test_empty_database_loads_but_nothing_matches() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = Arc::new(ReferenceDataRepository::new(&db_path).unwrap());
    let record_repo = Arc::new(CalculationRecordRepository::new(&db_path).unwrap());

    let loader = Arc::new(ReferenceDataLoader::new(repo, LoaderPolicy::default()));
    let api = CalculatorApi::new(loader, record_repo, AppSettings::default());
    let summary = api.reload_reference_data().await.unwrap();
    assert_eq!(summary.weights, 0);

    let response = api.calculate(500.0, 300.0, d(2024, 1, 8)).unwrap();
    assert_eq!(response.error_code.as_deref(), Some("OUT_OF_RANGE"));
}

#[tokio::test]
async fn test_failed_reload_keeps_previous_snapshot() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let record_repo = Arc::new(CalculationRecordRepository::new(&db_path).unwrap());

    let policy = LoaderPolicy {
        max_retries: 0,
        retry_base_ms: 1,
        timeout_ms: 500,
    };
    let source = Arc::new(BrokenSource {
        calls: AtomicU32::new(0),
    });
    let loader = Arc::new(ReferenceDataLoader::new(source, policy));
    let api = CalculatorApi::new(loader, record_repo, AppSettings::default());
    api.install_snapshot(Arc::new(standard_snapshot())).unwrap();

    let err = api.reload_reference_data().await.unwrap_err();
    assert_eq!(err.error_code(), "DATA_LOAD_ERROR");

    assert!(api.is_loaded().unwrap());
    let response = api.calculate(500.0, 300.0, d(2024, 1, 8)).unwrap();
    assert_eq!(response.result.rdd, d(2024, 1, 11));
}
