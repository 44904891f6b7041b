// ==========================================
// 生产可行性核心 - 订单行分配 API
// ==========================================
// 职责: 读取状态与成品库存 → 计划增量 → 原子落库
// 并发: 乐观重试（revision 冲突或库存冲突时刷新后重新计划）
// 红线: 拒绝必须输出 reason；所有决策记录 ActionLog
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, PlanningConfigReader};
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::allocation::{AllocationDecision, AllocationRequest, AllocationState};
use crate::domain::types::AllocationDecisionKind;
use crate::engine::AllocationPlanner;
use crate::repository::{
    ActionLogRepository, InventoryRepository, OrderLineRepository, RepositoryError,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// 分配结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResponse {
    pub decision: AllocationDecision,
    pub state: AllocationState, // 决策生效后的订单行状态
    pub attempts: u32,          // 实际尝试次数（含重试）
}

pub struct AllocationApi {
    order_line_repo: Arc<OrderLineRepository>,
    inventory_repo: Arc<InventoryRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    config_manager: Arc<ConfigManager>,
    planner: AllocationPlanner,
}

impl AllocationApi {
    pub fn new(
        order_line_repo: Arc<OrderLineRepository>,
        inventory_repo: Arc<InventoryRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            order_line_repo,
            inventory_repo,
            action_log_repo,
            config_manager,
            planner: AllocationPlanner::new(),
        }
    }

    /// 新建订单行
    pub fn create_line(
        &self,
        line_id: &str,
        order_id: &str,
        product_id: &str,
        ordered_qty: i64,
    ) -> ApiResult<AllocationState> {
        Ok(self
            .order_line_repo
            .create_line(line_id, order_id, product_id, ordered_qty)?)
    }

    pub fn get_line(&self, line_id: &str) -> ApiResult<AllocationState> {
        self.order_line_repo
            .find_by_line_id(line_id)?
            .ok_or_else(|| ApiError::NotFound(format!("OrderLine(id={})不存在", line_id)))
    }

    pub fn list_order_lines(&self, order_id: &str) -> ApiResult<Vec<AllocationState>> {
        Ok(self.order_line_repo.list_by_order(order_id)?)
    }

    /// 纯计划（不落库）: 基于边界请求与给定库存计算决策
    pub fn plan_request(
        &self,
        request: &AllocationRequest,
        available_stock: i64,
    ) -> ApiResult<AllocationDecision> {
        let state = AllocationState {
            line_id: request.line_id.clone(),
            order_id: String::new(),
            product_id: String::new(),
            ordered_qty: request.ordered_qty,
            allocated_qty: request.allocated_qty,
            revision: 0,
        };
        Ok(self
            .planner
            .plan_increment(&state, request.requested_increment, available_stock)?)
    }

    /// 为订单行分配成品库存
    ///
    /// # 流程（每次尝试）
    /// 1. 读取订单行与成品可用量
    /// 2. 计划增量（Full / Partial / Rejected）
    /// 3. 无实际授予量 → 直接返回（Rejected 记录日志）
    /// 4. 单事务落库；冲突时刷新重来，最多 allocation_max_retries 次重试
    #[instrument(skip(self))]
    pub async fn allocate(
        &self,
        line_id: &str,
        requested_increment: i64,
        actor: Option<&str>,
    ) -> ApiResult<AllocationResponse> {
        let actor = self.config_manager.resolve_actor(actor).await?;
        let max_attempts = self
            .config_manager
            .get_allocation_max_retries()
            .await?
            .saturating_add(1);

        for attempt in 1..=max_attempts {
            let state = self.get_line(line_id)?;
            let stock = self.available_stock(&state.product_id)?;
            let decision = self.planner.plan_increment(&state, requested_increment, stock)?;

            if !decision.is_effective() {
                if decision.decision_kind == AllocationDecisionKind::Rejected {
                    self.log_decision(ActionType::AllocateRejected, &actor, &decision);
                    info!(reason = ?decision.reason, "分配被拒绝");
                }
                return Ok(AllocationResponse {
                    decision,
                    state,
                    attempts: attempt,
                });
            }

            match self.order_line_repo.apply_allocation(&state, decision.granted_qty) {
                Ok(updated) => {
                    self.log_decision(ActionType::Allocate, &actor, &decision);
                    info!(
                        kind = %decision.decision_kind,
                        granted = decision.granted_qty,
                        allocated_qty = updated.allocated_qty,
                        attempt,
                        "分配已落库"
                    );
                    return Ok(AllocationResponse {
                        decision,
                        state: updated,
                        attempts: attempt,
                    });
                }
                Err(e @ RepositoryError::OptimisticLockFailure { .. })
                | Err(e @ RepositoryError::StockConflict { .. }) => {
                    warn!(attempt, max_attempts, error = %e, "分配并发冲突，刷新后重试");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ApiError::RetryExhausted {
            line_id: line_id.to_string(),
            attempts: max_attempts,
        })
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    /// 成品可用量（向下取整；未建档视为 0）
    fn available_stock(&self, product_id: &str) -> ApiResult<i64> {
        let available = self
            .inventory_repo
            .find_by_material(product_id)?
            .map(|level| level.available)
            .unwrap_or(0.0);
        debug!(product_id, available, "读取成品可用量");
        Ok(available.floor() as i64)
    }

    /// 决策已落库后记录日志；日志失败不回报为分配失败
    fn log_decision(&self, action_type: ActionType, actor: &str, decision: &AllocationDecision) {
        let log = ActionLog::now(action_type, actor, Some(&decision.line_id))
            .with_payload(json!(decision));
        let log = match &decision.reason {
            Some(reason) => log.with_detail(reason.clone()),
            None => log,
        };
        if let Err(e) = self.action_log_repo.insert(&log) {
            warn!(line_id = %decision.line_id, "记录操作日志失败: {}", e);
        }
    }
}
