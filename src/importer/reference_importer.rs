// ==========================================
// RDD 交期计算系统 - 参考数据导入器
// ==========================================
// 流程: 文件解析 → 字段映射 → 逐行落库 → 汇总
// 红线: 单行失败只记入汇总,不中断整个文件; 文件级错误直接返回
// ==========================================

use crate::domain::types::ReferenceTable;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{ReferenceFieldMapper, ReferenceRecord};
use crate::importer::file_parser::{FileParser, UniversalFileParser};
use crate::repository::reference_repo::ReferenceDataRepository;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

// ==========================================
// ImportSummary - 导入汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub table: ReferenceTable,
    pub total_rows: usize,
    pub imported: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

impl ImportSummary {
    fn new(table: ReferenceTable) -> Self {
        Self {
            table,
            total_rows: 0,
            imported: 0,
            failed: 0,
            errors: Vec::new(),
        }
    }

    fn record_failure(&mut self, error: ImportError) {
        self.failed += 1;
        self.errors.push(error.to_string());
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

// ==========================================
// ReferenceImporter - 导入器
// ==========================================
pub struct ReferenceImporter {
    repo: Arc<ReferenceDataRepository>,
    parser: Box<dyn FileParser>,
    mapper: ReferenceFieldMapper,
}

impl ReferenceImporter {
    pub fn new(repo: Arc<ReferenceDataRepository>) -> Self {
        Self {
            repo,
            parser: Box::new(UniversalFileParser),
            mapper: ReferenceFieldMapper,
        }
    }

    /// 导入单个文件
    ///
    /// # 参数
    /// - table: 目标参考表
    /// - file_path: CSV / XLSX 文件路径
    #[instrument(skip(self, file_path), fields(table = %table, file = %file_path.as_ref().display()))]
    pub async fn import_file<P: AsRef<Path>>(
        &self,
        table: ReferenceTable,
        file_path: P,
    ) -> ImportResult<ImportSummary> {
        let rows = self.parser.parse_to_raw_rows(file_path.as_ref())?;
        let mut summary = ImportSummary::new(table);
        summary.total_rows = rows.len();

        // 旺季没有自然键: 已有记录按 (名称, 起止日期) 复用 id,避免重复导入产生副本
        let existing_seasons: HashMap<(String, String, String), String> =
            if table == ReferenceTable::PeakSeasons {
                self.repo
                    .list_peak_seasons()?
                    .into_iter()
                    .map(|s| {
                        (
                            (s.name, s.start_date.to_string(), s.end_date.to_string()),
                            s.id,
                        )
                    })
                    .collect()
            } else {
                HashMap::new()
            };

        for row in &rows {
            let record = match self.mapper.map_row(table, row) {
                Ok(r) => r,
                Err(e) => {
                    warn!(row = row.row_number, error = %e, "行映射失败");
                    summary.record_failure(e);
                    continue;
                }
            };

            let written = match record {
                ReferenceRecord::Weight(w) => self.repo.upsert_weight_bracket(&w),
                ReferenceRecord::Distance(d) => self.repo.upsert_distance_bracket(&d),
                ReferenceRecord::TransitTime(t) => self
                    .repo
                    .upsert_transit_time(t.weight_bracket_id, t.distance_bracket_id, t.days)
                    .map(|_| ()),
                ReferenceRecord::Holiday(h) => self.repo.upsert_holiday_by_date(&h),
                ReferenceRecord::PeakSeason(s) => {
                    let key = (s.name.clone(), s.start_date.to_string(), s.end_date.to_string());
                    let id = s
                        .id
                        .clone()
                        .or_else(|| existing_seasons.get(&key).cloned())
                        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
                    self.repo.upsert_peak_season(&s.into_season(id))
                }
            };

            match written {
                Ok(()) => summary.imported += 1,
                Err(source) => {
                    let e = ImportError::RowWriteError {
                        row: row.row_number,
                        source,
                    };
                    warn!(row = row.row_number, error = %e, "行写入失败");
                    summary.record_failure(e);
                }
            }
        }

        info!(
            total = summary.total_rows,
            imported = summary.imported,
            failed = summary.failed,
            "参考数据导入完成"
        );
        Ok(summary)
    }

    /// 批量导入（并发执行,结果顺序与输入一致）
    ///
    /// 表之间存在引用关系（times → weights/distances）时,应先单独导入区间表
    pub async fn import_batch(
        &self,
        jobs: Vec<(ReferenceTable, PathBuf)>,
    ) -> Vec<ImportResult<ImportSummary>> {
        let futures = jobs
            .iter()
            .map(|(table, path)| self.import_file(*table, path.as_path()));
        join_all(futures).await
    }
}
