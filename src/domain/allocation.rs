// ==========================================
// 生产可行性核心 - 订单行分配领域模型
// ==========================================
// 红线: 0 <= allocated_qty <= ordered_qty
// 红线: allocated_qty 只增不减（取消订单不在本模块范围内）
// ==========================================

use crate::domain::types::AllocationDecisionKind;
use serde::{Deserialize, Serialize};

// ==========================================
// AllocationState - 订单行分配状态
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationState {
    pub line_id: String,    // 订单行ID
    pub order_id: String,   // 销售订单ID
    pub product_id: String, // 分配的成品
    pub ordered_qty: i64,   // 订购数量（建单时固定）
    pub allocated_qty: i64, // 已分配数量
    pub revision: i32,      // 乐观锁版本号
}

impl AllocationState {
    /// 新建订单行（allocated_qty = 0）
    pub fn new_line(line_id: &str, order_id: &str, product_id: &str, ordered_qty: i64) -> Self {
        Self {
            line_id: line_id.to_string(),
            order_id: order_id.to_string(),
            product_id: product_id.to_string(),
            ordered_qty,
            allocated_qty: 0,
            revision: 0,
        }
    }

    /// 剩余未分配需求
    pub fn remaining_demand(&self) -> i64 {
        self.ordered_qty - self.allocated_qty
    }

    pub fn is_fully_allocated(&self) -> bool {
        self.allocated_qty >= self.ordered_qty
    }
}

// ==========================================
// AllocationRequest - 分配请求（边界）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRequest {
    pub line_id: String,
    pub ordered_qty: i64,
    pub allocated_qty: i64,
    pub requested_increment: i64,
}

// ==========================================
// AllocationDecision - 分配决策
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationDecision {
    pub line_id: String,
    pub requested_qty: i64,
    pub granted_qty: i64,
    pub decision_kind: AllocationDecisionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortfall: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AllocationDecision {
    /// 是否需要落库（有实际授予量）
    pub fn is_effective(&self) -> bool {
        self.granted_qty > 0
    }
}
