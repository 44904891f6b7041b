// ==========================================
// 生产可行性核心 - 库存领域模型
// ==========================================
// available = 在手 - 已预留
// 核心层只读快照，变更以 InventoryDelta 形式交给仓储层执行
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// InventoryRecord - 库存边界记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub material_id: String,
    pub available: f64,
}

// ==========================================
// InventoryLevel - 物料库存水平（持久化实体）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryLevel {
    pub material_id: String,
    pub available: f64,
    pub revision: i32, // 乐观锁版本号
}

impl From<&InventoryLevel> for InventoryRecord {
    fn from(level: &InventoryLevel) -> Self {
        Self {
            material_id: level.material_id.clone(),
            available: level.available,
        }
    }
}

// ==========================================
// InventoryDelta - 建议的库存变化
// ==========================================
// quantity < 0 表示消耗, > 0 表示入库
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryDelta {
    pub material_id: String,
    pub quantity: f64,
}
