// ==========================================
// RDD 交期计算系统 - 导入层
// ==========================================
// 职责: 外部文件导入参考数据（管理员维护用）
// 支持: Excel (.xlsx), CSV
// ==========================================

pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod reference_importer;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use field_mapper::{ReferenceFieldMapper, ReferenceRecord};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRow, UniversalFileParser};
pub use reference_importer::{ImportSummary, ReferenceImporter};
