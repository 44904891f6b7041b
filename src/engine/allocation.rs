// ==========================================
// 生产可行性核心 - 分配计划引擎
// ==========================================
// 输入: 订单行当前分配状态 + 申请增量 + 可用库存
// 输出: AllocationDecision (Full / Partial / Rejected)
// 红线: 分配只增不减; 不直接写库，落库由仓储层原子执行
// ==========================================

use crate::domain::allocation::{AllocationDecision, AllocationState};
use crate::domain::types::AllocationDecisionKind;
use crate::engine::error::{EngineError, EngineResult};
use tracing::{debug, instrument};

pub const REASON_FULLY_ALLOCATED: &str = "already fully allocated";
pub const REASON_NO_STOCK: &str = "no stock";
pub const REASON_LIMITED_BY_DEMAND: &str = "limited by remaining demand";
pub const REASON_LIMITED_BY_STOCK: &str = "limited by available stock";

// ==========================================
// AllocationPlanner - 分配计划引擎
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocationPlanner;

impl AllocationPlanner {
    pub fn new() -> Self {
        Self
    }

    /// 计算本次分配增量
    ///
    /// # 规则
    /// 1. requested_increment < 0 → InvalidIncrement
    /// 2. allocated_qty > ordered_qty (或字段为负) → InvalidState
    /// 3. grantable = min(requested_increment, remaining_demand, available_stock)
    /// 4. requested_increment = 0 → Full (空操作)
    /// 5. grantable <= 0 → Rejected
    /// 6. grantable < requested_increment → Partial, shortfall = 差额
    /// 7. 否则 → Full
    #[instrument(skip(self, state), fields(line_id = %state.line_id))]
    pub fn plan_increment(
        &self,
        state: &AllocationState,
        requested_increment: i64,
        available_stock: i64,
    ) -> EngineResult<AllocationDecision> {
        if requested_increment < 0 {
            return Err(EngineError::InvalidIncrement {
                value: requested_increment,
            });
        }
        Self::check_state(state)?;

        let remaining_demand = state.remaining_demand();
        let stock = available_stock.max(0);
        let grantable = requested_increment.min(remaining_demand).min(stock);

        let decision = if requested_increment == 0 {
            Self::decision(state, 0, 0, AllocationDecisionKind::Full, None, None)
        } else if grantable <= 0 {
            let reason = if state.is_fully_allocated() {
                REASON_FULLY_ALLOCATED
            } else {
                REASON_NO_STOCK
            };
            Self::decision(
                state,
                requested_increment,
                0,
                AllocationDecisionKind::Rejected,
                None,
                Some(reason),
            )
        } else if grantable < requested_increment {
            let reason = if remaining_demand <= stock {
                REASON_LIMITED_BY_DEMAND
            } else {
                REASON_LIMITED_BY_STOCK
            };
            Self::decision(
                state,
                requested_increment,
                grantable,
                AllocationDecisionKind::Partial,
                Some(requested_increment - grantable),
                Some(reason),
            )
        } else {
            Self::decision(
                state,
                requested_increment,
                grantable,
                AllocationDecisionKind::Full,
                None,
                None,
            )
        };

        debug!(
            kind = %decision.decision_kind,
            granted = decision.granted_qty,
            remaining_demand,
            stock,
            "分配决策完成"
        );
        Ok(decision)
    }

    /// 应用决策到状态（返回新状态）
    ///
    /// 用于校验落库结果与单调性约束
    pub fn apply(
        &self,
        state: &AllocationState,
        decision: &AllocationDecision,
    ) -> EngineResult<AllocationState> {
        Self::check_state(state)?;
        if decision.granted_qty < 0 {
            return Err(EngineError::InvalidIncrement {
                value: decision.granted_qty,
            });
        }

        let mut next = state.clone();
        next.allocated_qty += decision.granted_qty;
        Self::check_state(&next)?;
        Ok(next)
    }

    /// 前置状态检查: 0 <= allocated_qty <= ordered_qty
    pub fn check_state(state: &AllocationState) -> EngineResult<()> {
        if state.ordered_qty < 0 || state.allocated_qty < 0 || state.allocated_qty > state.ordered_qty {
            return Err(EngineError::InvalidState {
                line_id: state.line_id.clone(),
                ordered_qty: state.ordered_qty,
                allocated_qty: state.allocated_qty,
            });
        }
        Ok(())
    }

    fn decision(
        state: &AllocationState,
        requested_qty: i64,
        granted_qty: i64,
        decision_kind: AllocationDecisionKind,
        shortfall: Option<i64>,
        reason: Option<&str>,
    ) -> AllocationDecision {
        AllocationDecision {
            line_id: state.line_id.clone(),
            requested_qty,
            granted_qty,
            decision_kind,
            shortfall,
            reason: reason.map(str::to_string),
        }
    }
}
