// ==========================================
// 生产可行性核心 - 生产 API
// ==========================================
// 职责: 可行性判定、生产单下达与完工
// 红线: 下达前必须重新判定；不可行不下达
// 红线: 所有写入记录 ActionLog
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, PlanningConfigReader};
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::bom::BomRecord;
use crate::domain::feasibility::{FeasibilityRequest, ProductionFeasibility};
use crate::domain::production::ProductionOrder;
use crate::domain::types::ProductionOrderStatus;
use crate::engine::{BomIndex, FeasibilityEvaluator, InventorySnapshot};
use crate::repository::{
    ActionLogRepository, BomRepository, InventoryRepository, ProductionOrderRepository,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// 批量判定的单项结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeasibilityOutcome {
    pub product_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feasibility: Option<ProductionFeasibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct ProductionApi {
    bom_repo: Arc<BomRepository>,
    inventory_repo: Arc<InventoryRepository>,
    production_repo: Arc<ProductionOrderRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    config_manager: Arc<ConfigManager>,
}

impl ProductionApi {
    pub fn new(
        bom_repo: Arc<BomRepository>,
        inventory_repo: Arc<InventoryRepository>,
        production_repo: Arc<ProductionOrderRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            bom_repo,
            inventory_repo,
            production_repo,
            action_log_repo,
            config_manager,
        }
    }

    // ==========================================
    // 可行性判定
    // ==========================================

    /// 判定单个产品的生产可行性（基于当前库存快照）
    #[instrument(skip(self))]
    pub async fn check_feasibility(
        &self,
        product_id: &str,
        requested_qty: f64,
    ) -> ApiResult<ProductionFeasibility> {
        let evaluator = self.evaluator().await?;
        let bom_index = self.load_product_bom(product_id)?;
        let inventory = self.load_inventory()?;

        let feasibility = evaluator.evaluate(product_id, requested_qty, &bom_index, &inventory)?;
        info!(
            overall_sufficient = feasibility.overall_sufficient,
            bom_defined = feasibility.bom_defined,
            "可行性判定完成"
        );
        Ok(feasibility)
    }

    /// 批量判定
    ///
    /// 所有请求共享同一份快照；单项失败记录在结果中，不中断其他项
    #[instrument(skip(self, requests), fields(count = requests.len()))]
    pub async fn check_feasibility_batch(
        &self,
        requests: &[FeasibilityRequest],
    ) -> ApiResult<Vec<FeasibilityOutcome>> {
        let evaluator = self.evaluator().await?;
        let bom_index = BomIndex::from_records(self.bom_repo.list_all_records()?)?;
        let inventory = self.load_inventory()?;

        let outcomes = requests
            .iter()
            .zip(evaluator.evaluate_batch(requests, &bom_index, &inventory))
            .map(|(request, result)| match result {
                Ok(feasibility) => FeasibilityOutcome {
                    product_id: request.product_id.clone(),
                    feasibility: Some(feasibility),
                    error: None,
                },
                Err(e) => FeasibilityOutcome {
                    product_id: request.product_id.clone(),
                    feasibility: None,
                    error: Some(e.to_string()),
                },
            })
            .collect();

        Ok(outcomes)
    }

    // ==========================================
    // 生产单
    // ==========================================

    /// 下达生产单
    ///
    /// # 流程
    /// 1. 基于最新快照重新判定
    /// 2. 不可行 → ProductionInfeasible（不写库）
    /// 3. 单事务: 写生产单 + 扣减 BOM 物料（带库存条件）
    /// 4. 记录 ActionLog（含判定与配置快照）
    #[instrument(skip(self))]
    pub async fn release_production(
        &self,
        product_id: &str,
        quantity: f64,
        actor: Option<&str>,
    ) -> ApiResult<ProductionOrder> {
        let feasibility = self.check_feasibility(product_id, quantity).await?;

        if !feasibility.overall_sufficient {
            let short_materials: Vec<String> = feasibility
                .insufficient()
                .map(|v| v.material_id.clone())
                .collect();
            warn!(?short_materials, bom_defined = feasibility.bom_defined, "生产不可行，拒绝下达");
            return Err(ApiError::ProductionInfeasible {
                product_id: product_id.to_string(),
                short_materials,
            });
        }

        let actor = self.config_manager.resolve_actor(actor).await?;
        let order = ProductionOrder {
            production_order_id: uuid::Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            quantity: feasibility.requested_qty,
            status: ProductionOrderStatus::Released,
            created_by: actor.clone(),
            created_at: Utc::now().naive_utc(),
            completed_at: None,
        };

        let consumption = feasibility.consumption();
        let feasibility_json = serde_json::to_string(&feasibility)?;
        let config_snapshot = self.config_manager.get_config_snapshot()?;

        self.production_repo.release(
            &order,
            &consumption,
            Some(&feasibility_json),
            Some(&config_snapshot),
        )?;

        let log = ActionLog::now(ActionType::ReleaseProduction, &actor, Some(&order.production_order_id))
            .with_payload(json!({
                "productId": order.product_id,
                "quantity": order.quantity,
                "consumption": consumption,
            }));
        if let Err(e) = self.action_log_repo.insert(&log) {
            warn!(production_order_id = %order.production_order_id, "记录操作日志失败: {}", e);
        }

        info!(production_order_id = %order.production_order_id, "生产单已下达");
        Ok(order)
    }

    /// 生产完工（成品入库）
    #[instrument(skip(self))]
    pub async fn complete_production(
        &self,
        production_order_id: &str,
        actor: Option<&str>,
    ) -> ApiResult<ProductionOrder> {
        let actor = self.config_manager.resolve_actor(actor).await?;
        let order = self
            .production_repo
            .complete(production_order_id, Utc::now().naive_utc())?;

        let log = ActionLog::now(ActionType::CompleteProduction, &actor, Some(production_order_id))
            .with_payload(json!({
                "productId": order.product_id,
                "output": order.quantity,
            }));
        if let Err(e) = self.action_log_repo.insert(&log) {
            warn!(production_order_id, "记录操作日志失败: {}", e);
        }

        info!(product_id = %order.product_id, quantity = order.quantity, "生产单已完工");
        Ok(order)
    }

    pub fn get_production_order(&self, production_order_id: &str) -> ApiResult<ProductionOrder> {
        self.production_repo
            .find_by_id(production_order_id)?
            .ok_or_else(|| ApiError::NotFound(format!("ProductionOrder(id={})不存在", production_order_id)))
    }

    pub fn list_production_orders(&self, product_id: &str) -> ApiResult<Vec<ProductionOrder>> {
        Ok(self.production_repo.list_by_product(product_id)?)
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    async fn evaluator(&self) -> ApiResult<FeasibilityEvaluator> {
        let policy = self.config_manager.get_empty_bom_policy().await?;
        Ok(FeasibilityEvaluator::new(policy))
    }

    fn load_product_bom(&self, product_id: &str) -> ApiResult<BomIndex> {
        let records = self
            .bom_repo
            .find_by_product(product_id)?
            .into_iter()
            .map(|component| BomRecord {
                product_id: product_id.to_string(),
                material_id: component.material_id,
                quantity_per_unit: component.quantity_per_unit,
                unit: component.unit,
                component_type: component.component_type,
            });
        Ok(BomIndex::from_records(records)?)
    }

    fn load_inventory(&self) -> ApiResult<InventorySnapshot> {
        Ok(InventorySnapshot::from_records(self.inventory_repo.snapshot_records()?)?)
    }
}
