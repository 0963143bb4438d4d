// ==========================================
// 仓储订单调配优化系统 - CLI 主入口
// ==========================================
// 用途: 从 CSV 读取仓库/订单,执行分配求解,输出 JSON 报表
// 展示层属于薄胶水: 解析参数 → 调 FulfillmentApi → 打印结果
// ==========================================

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use logitrack_aps::api::FulfillmentApi;
use logitrack_aps::config::OptimizeConfig;
use logitrack_aps::domain::types::OptimizeMode;
use logitrack_aps::{db, logging};
use std::path::PathBuf;

/// 命令行参数
struct CliArgs {
    warehouse_file: PathBuf,
    order_file: PathBuf,
    db_path: Option<String>,
    mode: Option<OptimizeMode>,
    today: Option<NaiveDate>,
    simulate: bool,
}

fn print_usage() {
    println!("用法: logitrack-aps <warehouses.csv> <orders.csv> [选项]");
    println!();
    println!("选项:");
    println!("  --db <path>        数据库路径（默认: 用户数据目录）");
    println!("  --mode <mode>      求解模式: exact | greedy（默认: 持久化配置）");
    println!("  --today <date>     基准日期 YYYY-MM-DD（默认: 系统日期）");
    println!("  --simulate         仅模拟,不提交库存变更");
}

fn parse_args() -> Result<CliArgs> {
    let mut positional: Vec<String> = Vec::new();
    let mut db_path = None;
    let mut mode = None;
    let mut today = None;
    let mut simulate = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" => {
                db_path = Some(args.next().context("--db 缺少参数")?);
            }
            "--mode" => {
                let raw = args.next().context("--mode 缺少参数")?;
                mode = Some(
                    OptimizeMode::parse(&raw)
                        .with_context(|| format!("无法识别的求解模式: {}", raw))?,
                );
            }
            "--today" => {
                let raw = args.next().context("--today 缺少参数")?;
                today = Some(
                    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                        .with_context(|| format!("无法解析日期: {}", raw))?,
                );
            }
            "--simulate" => simulate = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other if other.starts_with("--") => bail!("未知选项: {}", other),
            other => positional.push(other.to_string()),
        }
    }

    if positional.len() != 2 {
        print_usage();
        bail!("需要两个位置参数: 仓库 CSV 与订单 CSV");
    }

    Ok(CliArgs {
        warehouse_file: PathBuf::from(&positional[0]),
        order_file: PathBuf::from(&positional[1]),
        db_path,
        mode,
        today,
        simulate,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} v{}", logitrack_aps::APP_NAME, logitrack_aps::VERSION);
    tracing::info!("==================================================");

    let args = parse_args()?;
    let db_path = args.db_path.unwrap_or_else(db::default_db_path);
    if let Some(parent) = PathBuf::from(&db_path).parent() {
        std::fs::create_dir_all(parent).ok();
    }
    tracing::info!("使用数据库: {}", db_path);

    let api = FulfillmentApi::new(&db_path).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    // 导入仓库数据
    let warehouse_outcome = api
        .import_warehouse_file(&args.warehouse_file)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    for violation in &warehouse_outcome.report.violations {
        tracing::warn!(
            row = violation.row_number,
            field = %violation.field,
            "仓库数据违规: {}",
            violation.message
        );
    }

    // 加载订单数据
    let order_outcome = api
        .load_order_file(&args.order_file)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    for violation in &order_outcome.report.violations {
        tracing::warn!(
            row = violation.row_number,
            field = %violation.field,
            "订单数据违规: {}",
            violation.message
        );
    }

    // 求解参数: 持久化配置 + 命令行覆写
    let mut config: OptimizeConfig = api
        .load_config()
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    if let Some(mode) = args.mode {
        config.mode = mode;
    }

    let today = args
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let outcome = if args.simulate {
        api.simulate_optimization(order_outcome.accepted, Some(config), today)
            .await
    } else {
        api.run_optimization(order_outcome.accepted, Some(config), today)
            .await
    }
    .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    tracing::info!(
        mode_used = %outcome.summary.mode_used,
        degraded = outcome.summary.degraded,
        total_cost = outcome.summary.total_cost,
        fulfilled = outcome.summary.fulfilled_count,
        partial = outcome.summary.partial_count,
        unmet = outcome.summary.unmet_count,
        "求解完成"
    );

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
