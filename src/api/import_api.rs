// ==========================================
// 生产可行性核心 - 数据导入 API
// ==========================================
// 职责: 文件 → 边界记录 → 边界校验 → 落库 → ActionLog
// 红线: 任一行校验失败则整个文件不落库
// ==========================================

use crate::api::error::ApiResult;
use crate::config::ConfigManager;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::engine::{BomIndex, InventorySnapshot};
use crate::importer::{RecordMapper, UniversalFileParser};
use crate::repository::{ActionLogRepository, BomRepository, InventoryRepository, ProductRepository};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// 导入结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub source_file: String,
    pub row_count: usize,    // 有效数据行数
    pub entity_count: usize, // 涉及的产品/物料数
    pub elapsed_ms: u64,
}

pub struct ImportApi {
    bom_repo: Arc<BomRepository>,
    inventory_repo: Arc<InventoryRepository>,
    product_repo: Arc<ProductRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    config_manager: Arc<ConfigManager>,
}

impl ImportApi {
    pub fn new(
        bom_repo: Arc<BomRepository>,
        inventory_repo: Arc<InventoryRepository>,
        product_repo: Arc<ProductRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            bom_repo,
            inventory_repo,
            product_repo,
            action_log_repo,
            config_manager,
        }
    }

    /// 导入 BOM 文件（按产品整体替换）
    #[instrument(skip(self, file_path), fields(file = %file_path.as_ref().display()))]
    pub async fn import_bom<P: AsRef<Path>>(
        &self,
        file_path: P,
        actor: Option<&str>,
    ) -> ApiResult<ImportSummary> {
        let started = Instant::now();
        let actor = self.config_manager.resolve_actor(actor).await?;
        let rows = UniversalFileParser.parse(file_path.as_ref())?;
        let records = RecordMapper.map_bom_rows(&rows)?;

        let index = BomIndex::from_records(records.iter().cloned())?;
        self.bom_repo.import_records(&records)?;

        let summary = summarize(file_path.as_ref(), records.len(), index.product_count(), started);
        self.log_import(ActionType::ImportBom, &actor, &summary);
        info!(rows = summary.row_count, products = summary.entity_count, "BOM 导入完成");
        Ok(summary)
    }

    /// 导入库存文件（覆盖可用量，同一物料多行累加）
    #[instrument(skip(self, file_path), fields(file = %file_path.as_ref().display()))]
    pub async fn import_inventory<P: AsRef<Path>>(
        &self,
        file_path: P,
        actor: Option<&str>,
    ) -> ApiResult<ImportSummary> {
        let started = Instant::now();
        let actor = self.config_manager.resolve_actor(actor).await?;
        let rows = UniversalFileParser.parse(file_path.as_ref())?;
        let records = RecordMapper.map_inventory_rows(&rows)?;

        let snapshot = InventorySnapshot::from_records(records.iter().cloned())?;
        self.inventory_repo.import_records(&records)?;

        let summary = summarize(file_path.as_ref(), records.len(), snapshot.len(), started);
        self.log_import(ActionType::ImportInventory, &actor, &summary);
        info!(rows = summary.row_count, materials = summary.entity_count, "库存导入完成");
        Ok(summary)
    }

    /// 导入产品目录
    #[instrument(skip(self, file_path), fields(file = %file_path.as_ref().display()))]
    pub async fn import_products<P: AsRef<Path>>(
        &self,
        file_path: P,
        actor: Option<&str>,
    ) -> ApiResult<ImportSummary> {
        let started = Instant::now();
        let actor = self.config_manager.resolve_actor(actor).await?;
        let rows = UniversalFileParser.parse(file_path.as_ref())?;
        let products = RecordMapper.map_product_rows(&rows)?;

        self.product_repo.upsert_batch(&products)?;

        let summary = summarize(file_path.as_ref(), products.len(), products.len(), started);
        self.log_import(ActionType::ImportProducts, &actor, &summary);
        info!(rows = summary.row_count, "产品目录导入完成");
        Ok(summary)
    }

    fn log_import(&self, action_type: ActionType, actor: &str, summary: &ImportSummary) {
        let log = ActionLog::now(action_type, actor, None).with_payload(json!(summary));
        if let Err(e) = self.action_log_repo.insert(&log) {
            warn!(source_file = %summary.source_file, "记录操作日志失败: {}", e);
        }
    }
}

fn summarize(path: &Path, row_count: usize, entity_count: usize, started: Instant) -> ImportSummary {
    ImportSummary {
        source_file: path.display().to_string(),
        row_count,
        entity_count,
        elapsed_ms: started.elapsed().as_millis() as u64,
    }
}
