// ==========================================
// RDD 交期计算系统 - 命令行入口
// ==========================================
// 用法:
//   rdd-calculator <weight> <distance> <YYYY-MM-DD> [db_path]
//   rdd-calculator dashboard [db_path]
//   rdd-calculator validate [db_path]
// 输出: JSON 写 stdout,日志写 stderr
// ==========================================

use chrono::{Local, NaiveDate};
use rdd_calculator::app::{get_default_db_path, AppState};
use rdd_calculator::domain::CalculationInput;
use rdd_calculator::{logging, APP_NAME, VERSION};
use serde_json::json;
use std::error::Error;

const USAGE: &str = "用法:
  rdd-calculator <weight> <distance> <YYYY-MM-DD> [db_path]
  rdd-calculator dashboard [db_path]
  rdd-calculator validate [db_path]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    logging::init();
    tracing::info!("{} v{}", APP_NAME, VERSION);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(first) = args.first() else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };

    match first.as_str() {
        "dashboard" => {
            let state = open_state(args.get(1))?;
            let summary = state
                .dashboard_api
                .get_dashboard_summary(Local::now().naive_local())?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        "validate" => {
            let state = open_state(args.get(1))?;
            let report = state.reference_data_api.validate_reference_data()?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if report.has_errors() {
                std::process::exit(1);
            }
        }
        _ => {
            if args.len() < 3 {
                eprintln!("{}", USAGE);
                std::process::exit(2);
            }
            let weight: f64 = args[0].parse().map_err(|_| format!("无效重量: {}", args[0]))?;
            let distance: f64 = args[1].parse().map_err(|_| format!("无效距离: {}", args[1]))?;
            let load_date = NaiveDate::parse_from_str(&args[2], "%Y-%m-%d")
                .map_err(|_| format!("无效装车日期: {}", args[2]))?;

            let state = open_state(args.get(3))?;
            state.calculator_api.reload_reference_data().await?;

            let input = CalculationInput::new(weight, distance, load_date);
            let (response, recorded) =
                state.calculator_api.calculate_and_record(input, None, None)?;
            if !recorded.ok {
                tracing::warn!(?recorded, "计算记录未完整保存");
            }

            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "result": response,
                    "record": recorded,
                }))?
            );
            if response.result.error.is_some() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn open_state(db_path: Option<&String>) -> Result<AppState, Box<dyn Error>> {
    let db_path = db_path.cloned().unwrap_or_else(get_default_db_path);
    Ok(AppState::new(db_path)?)
}
