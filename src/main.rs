// ==========================================
// 生产可行性核心 - 命令行入口
// ==========================================
// 输出: 结果以 JSON 打印到 stdout，日志写 stderr
// ==========================================

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use erp_production_core::app::{get_default_db_path, AppState};
use erp_production_core::domain::FeasibilityRequest;
use erp_production_core::{logging, APP_NAME, VERSION};

#[derive(Parser)]
#[command(name = "erp-production-core")]
#[command(about = "BOM-driven production feasibility and inventory allocation")]
#[command(version)]
struct Cli {
    /// SQLite database path (defaults to the user data directory)
    #[arg(long, global = true)]
    db: Option<String>,

    /// Actor recorded in the action log
    #[arg(long, global = true)]
    actor: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema
    InitDb,
    /// Import BOM lines from a CSV/XLSX file
    ImportBom { file: PathBuf },
    /// Import inventory levels from a CSV/XLSX file
    ImportInventory { file: PathBuf },
    /// Import the product catalog from a CSV/XLSX file
    ImportProducts { file: PathBuf },
    /// List current inventory levels
    Inventory,
    /// Check whether a product can be produced
    Feasibility { product_id: String, quantity: f64 },
    /// Check a JSON array of {productId, requestedQty} requests
    FeasibilityBatch { file: PathBuf },
    /// Release a production order (consumes BOM materials)
    Release { product_id: String, quantity: f64 },
    /// Complete a production order (receives finished goods)
    Complete { production_order_id: String },
    /// Show a production order
    Order { production_order_id: String },
    /// Create a sales order line
    CreateLine {
        line_id: String,
        order_id: String,
        product_id: String,
        ordered_qty: i64,
    },
    /// Allocate finished-goods stock to an order line
    Allocate { line_id: String, quantity: i64 },
    /// Show an order line
    Line { line_id: String },
    /// Show the action log of an entity
    Logs { entity_id: String },
    /// Read or write configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print all configuration values
    Show,
    /// Set a configuration value
    Set { key: String, value: String },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_json);

    tracing::info!("{} v{}", APP_NAME, VERSION);

    let db_path = cli.db.clone().unwrap_or_else(get_default_db_path);
    let state = AppState::new(db_path).map_err(|e| anyhow::anyhow!(e))?;
    let actor = cli.actor.as_deref();

    match cli.command {
        Commands::InitDb => {
            tracing::info!("数据库已就绪: {}", state.db_path);
        }
        Commands::ImportBom { file } => {
            print_json(&state.import_api.import_bom(&file, actor).await?)?;
        }
        Commands::ImportInventory { file } => {
            print_json(&state.import_api.import_inventory(&file, actor).await?)?;
        }
        Commands::ImportProducts { file } => {
            print_json(&state.import_api.import_products(&file, actor).await?)?;
        }
        Commands::Inventory => {
            print_json(&state.inventory_repo.list_all()?)?;
        }
        Commands::Feasibility {
            product_id,
            quantity,
        } => {
            let report = state
                .production_api
                .check_feasibility(&product_id, quantity)
                .await?;
            print_json(&report)?;
        }
        Commands::FeasibilityBatch { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("无法读取请求文件: {}", file.display()))?;
            let requests: Vec<FeasibilityRequest> = serde_json::from_str(&raw)?;
            print_json(&state.production_api.check_feasibility_batch(&requests).await?)?;
        }
        Commands::Release {
            product_id,
            quantity,
        } => {
            let order = state
                .production_api
                .release_production(&product_id, quantity, actor)
                .await?;
            print_json(&order)?;
        }
        Commands::Complete {
            production_order_id,
        } => {
            let order = state
                .production_api
                .complete_production(&production_order_id, actor)
                .await?;
            print_json(&order)?;
        }
        Commands::Order {
            production_order_id,
        } => {
            let order = state.production_api.get_production_order(&production_order_id)?;
            print_json(&order)?;
        }
        Commands::CreateLine {
            line_id,
            order_id,
            product_id,
            ordered_qty,
        } => {
            let line = state
                .allocation_api
                .create_line(&line_id, &order_id, &product_id, ordered_qty)?;
            print_json(&line)?;
        }
        Commands::Allocate { line_id, quantity } => {
            let response = state.allocation_api.allocate(&line_id, quantity, actor).await?;
            print_json(&response)?;
        }
        Commands::Line { line_id } => {
            print_json(&state.allocation_api.get_line(&line_id)?)?;
        }
        Commands::Logs { entity_id } => {
            print_json(&state.action_log_repo.find_by_entity_id(&entity_id)?)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let snapshot: serde_json::Value =
                    serde_json::from_str(&state.config_manager.get_config_snapshot()?)?;
                print_json(&snapshot)?;
            }
            ConfigAction::Set { key, value } => {
                state.config_manager.set_config_value(&key, &value)?;
            }
        },
    }

    Ok(())
}
