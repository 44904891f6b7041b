// ==========================================
// 生产可行性核心 - 应用状态
// ==========================================
// 职责: 打开数据库、建库、装配仓储与 API 实例
// 约束: 所有仓储共享同一个连接
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::api::{AllocationApi, ImportApi, ProductionApi};
use crate::config::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::repository::{
    ActionLogRepository, BomRepository, InventoryRepository, OrderLineRepository,
    ProductRepository, ProductionOrderRepository,
};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "ERP_PRODUCTION_CORE_DB_PATH";

/// 应用状态
pub struct AppState {
    pub db_path: String,
    pub config_manager: Arc<ConfigManager>,
    pub action_log_repo: Arc<ActionLogRepository>,
    pub product_repo: Arc<ProductRepository>,
    pub inventory_repo: Arc<InventoryRepository>,
    pub production_api: Arc<ProductionApi>,
    pub allocation_api: Arc<AllocationApi>,
    pub import_api: Arc<ImportApi>,
}

impl AppState {
    /// 创建应用状态（数据库不存在时自动建库）
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("建库失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let bom_repo = Arc::new(BomRepository::new(conn.clone()));
        let inventory_repo = Arc::new(InventoryRepository::new(conn.clone()));
        let product_repo = Arc::new(ProductRepository::new(conn.clone()));
        let order_line_repo = Arc::new(OrderLineRepository::new(conn.clone()));
        let production_repo = Arc::new(ProductionOrderRepository::new(conn.clone()));
        let action_log_repo = Arc::new(ActionLogRepository::new(conn.clone()));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 初始化API层
        // ==========================================
        let production_api = Arc::new(ProductionApi::new(
            bom_repo.clone(),
            inventory_repo.clone(),
            production_repo,
            action_log_repo.clone(),
            config_manager.clone(),
        ));
        let allocation_api = Arc::new(AllocationApi::new(
            order_line_repo,
            inventory_repo.clone(),
            action_log_repo.clone(),
            config_manager.clone(),
        ));
        let import_api = Arc::new(ImportApi::new(
            bom_repo,
            inventory_repo.clone(),
            product_repo.clone(),
            action_log_repo.clone(),
            config_manager.clone(),
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            config_manager,
            action_log_repo,
            product_repo,
            inventory_repo,
            production_api,
            allocation_api,
            import_api,
        })
    }
}

/// 默认数据库路径
///
/// 优先级: 环境变量 > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./erp_production_core.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("erp-production-core");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("erp_production_core.db");
        }
    }

    path.to_string_lossy().to_string()
}
