// ==========================================
// 生产可行性核心 - 生产单领域模型
// ==========================================
// 生产单只在可行性判定通过后创建
// 下达: 扣减 BOM 物料; 完工: 成品入库
// ==========================================

use crate::domain::types::ProductionOrderStatus;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionOrder {
    pub production_order_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub status: ProductionOrderStatus,
    pub created_by: String,
    pub created_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
}
