// ==========================================
// RDD 交期计算系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod calculation_record_repo;
pub mod error;
pub mod reference_repo;

// 重导出核心仓储
pub use calculation_record_repo::CalculationRecordRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use reference_repo::ReferenceDataRepository;
