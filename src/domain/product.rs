// ==========================================
// 生产可行性核心 - 产品领域模型
// ==========================================
// 只读参考数据，由外部产品目录维护
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: String, // 产品ID (唯一)
    pub name: String,       // 产品名称
    pub sku: String,        // SKU
}
