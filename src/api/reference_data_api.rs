// ==========================================
// RDD 交期计算系统 - 参考数据管理 API
// ==========================================
// 职责: 参考表的查询/维护/导入/质量检查（管理员使用）
// 说明: 写入后需调用 CalculatorApi::reload_reference_data 才会影响计算
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::reference::{
    DistanceBracket, Holiday, PeakSeason, ReferenceSnapshot, TransitTimeEntry, WeightBracket,
    MAX_TRANSIT_DAYS,
};
use crate::domain::types::ReferenceTable;
use crate::engine::validator::{ReferenceValidator, ValidationReport};
use crate::importer::error::ImportError;
use crate::importer::reference_importer::{ImportSummary, ReferenceImporter};
use crate::repository::reference_repo::ReferenceDataRepository;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub struct ReferenceDataApi {
    repo: Arc<ReferenceDataRepository>,
    importer: ReferenceImporter,
    validator: ReferenceValidator,
}

impl ReferenceDataApi {
    pub fn new(repo: Arc<ReferenceDataRepository>) -> Self {
        Self {
            importer: ReferenceImporter::new(repo.clone()),
            repo,
            validator: ReferenceValidator::default(),
        }
    }

    fn check_range(label: &str, min: f64, max: f64) -> ApiResult<()> {
        if !min.is_finite() || !max.is_finite() {
            return Err(ApiError::InvalidInput(format!("{} 区间边界必须为有限数", label)));
        }
        if min > max {
            return Err(ApiError::ValidationError(format!(
                "{} 区间下限 {} 大于上限 {}",
                label, min, max
            )));
        }
        Ok(())
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn get_snapshot(&self) -> ApiResult<ReferenceSnapshot> {
        Ok(self.repo.load_snapshot()?)
    }

    /// 检查当前库内参考数据
    pub fn validate_reference_data(&self) -> ApiResult<ValidationReport> {
        let snapshot = self.repo.load_snapshot()?;
        Ok(self.validator.validate(&snapshot))
    }

    // ==========================================
    // 维护
    // ==========================================

    pub fn save_weight_bracket(&self, bracket: &WeightBracket) -> ApiResult<()> {
        Self::check_range("重量", bracket.min_weight, bracket.max_weight)?;
        self.repo.upsert_weight_bracket(bracket)?;
        Ok(())
    }

    pub fn save_distance_bracket(&self, bracket: &DistanceBracket) -> ApiResult<()> {
        Self::check_range("距离", bracket.min_distance, bracket.max_distance)?;
        self.repo.upsert_distance_bracket(bracket)?;
        Ok(())
    }

    /// 保存运输天数（区间须已存在）
    pub fn save_transit_time(
        &self,
        weight_bracket_id: i64,
        distance_bracket_id: i64,
        days: i64,
    ) -> ApiResult<i64> {
        if !TransitTimeEntry::days_in_range(days) {
            return Err(ApiError::ValidationError(format!(
                "运输天数超出范围 ±{}: {}",
                MAX_TRANSIT_DAYS, days
            )));
        }
        Ok(self
            .repo
            .upsert_transit_time(weight_bracket_id, distance_bracket_id, days)?)
    }

    pub fn save_holiday(&self, holiday: &Holiday) -> ApiResult<()> {
        if holiday.name.trim().is_empty() {
            return Err(ApiError::InvalidInput("假日名称不能为空".to_string()));
        }
        self.repo.upsert_holiday(holiday)?;
        Ok(())
    }

    pub fn save_peak_season(&self, season: &PeakSeason) -> ApiResult<()> {
        if season.start_date > season.end_date {
            return Err(ApiError::ValidationError(format!(
                "旺季开始日 {} 晚于结束日 {}",
                season.start_date, season.end_date
            )));
        }
        self.repo.upsert_peak_season(season)?;
        Ok(())
    }

    /// 删除记录
    ///
    /// # 参数
    /// - table: 参考表
    /// - id: 记录 id（区间/运输天数为整数,假日/旺季为 UUID）
    pub fn delete(&self, table: ReferenceTable, id: &str) -> ApiResult<()> {
        let parse_int = |raw: &str| {
            raw.trim()
                .parse::<i64>()
                .map_err(|_| ApiError::InvalidInput(format!("无效的 id: {}", raw)))
        };

        let affected = match table {
            ReferenceTable::Weights => self.repo.delete_weight_bracket(parse_int(id)?)?,
            ReferenceTable::Distances => self.repo.delete_distance_bracket(parse_int(id)?)?,
            ReferenceTable::Times => self.repo.delete_transit_time(parse_int(id)?)?,
            ReferenceTable::Holidays => self.repo.delete_holiday(id)?,
            ReferenceTable::PeakSeasons => self.repo.delete_peak_season(id)?,
        };

        if affected == 0 {
            return Err(ApiError::NotFound(format!("{}(id={})不存在", table, id)));
        }
        info!(table = %table, id, "参考数据已删除");
        Ok(())
    }

    // ==========================================
    // 导入
    // ==========================================

    /// 从文件导入
    ///
    /// # 参数
    /// - table: 表名（weights / distances / times / holidays / peak_seasons,或数据库表名）
    /// - file_path: CSV / XLSX 路径
    pub async fn import_file<P: AsRef<Path>>(
        &self,
        table: &str,
        file_path: P,
    ) -> ApiResult<ImportSummary> {
        let table = ReferenceTable::parse(table)
            .ok_or_else(|| ImportError::UnknownTable(table.to_string()))?;
        Ok(self.importer.import_file(table, file_path).await?)
    }
}
