// ==========================================
// RDD 交期计算系统 - 参考数据导入工具
// ==========================================
// 用法: import_reference_data <table> <file.csv|file.xlsx> [db_path]
// table: weights / distances / times / holidays / peak_seasons
// 导入区间表后再导入 times,否则外键校验会拒绝
// ==========================================

use rdd_calculator::app::{get_default_db_path, AppState};
use rdd_calculator::logging;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        eprintln!("用法: import_reference_data <table> <file> [db_path]");
        std::process::exit(2);
    }

    let db_path = args.get(2).cloned().unwrap_or_else(get_default_db_path);
    let state = AppState::new(db_path)?;

    let runtime = tokio::runtime::Runtime::new()?;
    let summary = runtime.block_on(
        state
            .reference_data_api
            .import_file(&args[0], &args[1]),
    )?;

    println!("{}", serde_json::to_string_pretty(&summary)?);

    let report = state.reference_data_api.validate_reference_data()?;
    for finding in &report.findings {
        eprintln!("[{}] {}: {}", finding.severity, finding.code, finding.message);
    }

    if summary.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
