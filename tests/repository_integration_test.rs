// ==========================================
// 参考数据仓储 / 管理 API 集成测试
// ==========================================
// 测试目标: 文件库持久化、级联删除、管理 API 校验
// ==========================================


use rdd_calculator::api::{ApiError, ReferenceDataApi};
use rdd_calculator::domain::reference::{Holiday, PeakSeason, WeightBracket};
use rdd_calculator::domain::types::ReferenceTable;
use rdd_calculator::repository::ReferenceDataRepository;
use std::sync::Arc;
use test_helpers::{create_test_db, d, seed_reference_data, seeded_repo};

#[test]
fn test_snapshot_survives_reopen() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    {
        let repo = ReferenceDataRepository::new(&db_path).unwrap();
        seed_reference_data(&repo).unwrap();
    }

    let reopened = ReferenceDataRepository::new(&db_path).unwrap();
    let snapshot = reopened.load_snapshot().unwrap();
    assert_eq!(snapshot.weights.len(), 2);
    assert_eq!(snapshot.distances.len(), 2);
    assert_eq!(snapshot.times.len(), 3);
    assert_eq!(snapshot.holidays[0].date, d(2024, 7, 4));
    assert_eq!(snapshot.peak_seasons[0].name, "Holiday Rush");
}

#[test]
fn test_deleting_bracket_cascades_to_transit_times() {
    let (_temp_file, repo) = seeded_repo().unwrap();

    assert_eq!(repo.delete_weight_bracket(1).unwrap(), 1);
    let times = repo.list_transit_times().unwrap();
    assert_eq!(times.len(), 1);
    assert_eq!(times[0].weight_bracket_id, 2);
}

#[test]
fn test_upsert_transit_time_updates_existing_pair() {
    let (_temp_file, repo) = seeded_repo().unwrap();

    let before = repo.upsert_transit_time(1, 1, 3).unwrap();
    let after = repo.upsert_transit_time(1, 1, 7).unwrap();
    assert_eq!(before, after);

    let entry = repo
        .list_transit_times()
        .unwrap()
        .into_iter()
        .find(|t| t.matches(1, 1))
        .unwrap();
    assert_eq!(entry.days, 7);
}

#[test]
fn test_duplicate_holiday_date_rejected_by_id_upsert() {
    let (_temp_file, repo) = seeded_repo().unwrap();
    let err = repo
        .upsert_holiday(&Holiday::new(d(2024, 7, 4), "Fourth of July"))
        .unwrap_err();
    assert!(err.to_string().contains("UNIQUE") || err.to_string().contains("唯一"));

    // 按日期写入时只更新名称
    repo.upsert_holiday_by_date(&Holiday::new(d(2024, 7, 4), "Fourth of July"))
        .unwrap();
    let holidays = repo.list_holidays().unwrap();
    assert_eq!(holidays.len(), 2);
    assert_eq!(holidays[0].name, "Fourth of July");
}

#[test]
fn test_api_rejects_inverted_ranges() {
    let (_temp_file, repo) = seeded_repo().unwrap();
    let api = ReferenceDataApi::new(Arc::new(repo));

    let err = api
        .save_weight_bracket(&WeightBracket::new(3, 9000.0, 6000.0))
        .unwrap_err();
    assert!(matches!(err, ApiError::ValidationError(_)));

    let err = api
        .save_peak_season(&PeakSeason::new(d(2024, 12, 31), d(2024, 11, 1), "Backwards"))
        .unwrap_err();
    assert!(matches!(err, ApiError::ValidationError(_)));

    let err = api
        .save_holiday(&Holiday::new(d(2024, 9, 2), "  "))
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}

#[test]
fn test_api_delete_reports_missing_rows() {
    let (_temp_file, repo) = seeded_repo().unwrap();
    let repo = Arc::new(repo);
    let api = ReferenceDataApi::new(repo.clone());

    let season_id = repo.list_peak_seasons().unwrap()[0].id.clone();
    api.delete(ReferenceTable::PeakSeasons, &season_id).unwrap();
    assert!(repo.list_peak_seasons().unwrap().is_empty());

    let err = api.delete(ReferenceTable::PeakSeasons, &season_id).unwrap_err();
    assert_eq!(err.error_code(), "NOT_FOUND");

    let err = api.delete(ReferenceTable::Weights, "one").unwrap_err();
    assert_eq!(err.error_code(), "INVALID_INPUT");
}

#[test]
fn test_api_transit_time_requires_known_brackets() {
    let (_temp_file, repo) = seeded_repo().unwrap();
    let api = ReferenceDataApi::new(Arc::new(repo));

    let err = api.save_transit_time(42, 1, 3).unwrap_err();
    assert_eq!(err.error_code(), "BUSINESS_RULE_VIOLATION");

    assert!(api.save_transit_time(2, 2, 6).is_ok());
}

#[test]
fn test_api_rejects_transit_days_beyond_limit() {
    let (_temp_file, repo) = seeded_repo().unwrap();
    let repo = Arc::new(repo);
    let api = ReferenceDataApi::new(repo.clone());

    let err = api.save_transit_time(2, 2, 200_000_000).unwrap_err();
    assert!(matches!(err, ApiError::ValidationError(_)));
    assert!(!repo.list_transit_times().unwrap().iter().any(|t| t.matches(2, 2)));

    assert!(api.save_transit_time(2, 2, -2).is_ok());
}

#[test]
fn test_validate_reference_data_reports_findings() {
    let (_temp_file, repo) = seeded_repo().unwrap();
    let api = ReferenceDataApi::new(Arc::new(repo));

    let report = api.validate_reference_data().unwrap();
    assert!(!report.has_errors());
    assert!(report.contains("TRANSIT_MISSING_PAIR"));

    // 重叠区间
    api.save_weight_bracket(&WeightBracket::new(3, 4000.0, 8000.0))
        .unwrap();
    let report = api.validate_reference_data().unwrap();
    assert!(report.contains("WEIGHT_OVERLAP"));
    assert!(report.has_errors());
}
