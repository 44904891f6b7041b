// ==========================================
// 生产可行性核心 - 物料清单 (BOM) 领域模型
// ==========================================
// BOM = product_id → 有序 BomComponent 列表
// 顺序仅用于展示，不影响可行性判定
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// BomRecord - BOM 边界记录
// ==========================================
// 外部数据源（导入文件/数据库）的一行 BOM 数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BomRecord {
    pub product_id: String,
    pub material_id: String,
    pub quantity_per_unit: f64,
    pub unit: String,
    #[serde(rename = "type")]
    pub component_type: String,
}

// ==========================================
// BomComponent - BOM 组成行
// ==========================================
// 红线: quantity_per_unit >= 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BomComponent {
    pub material_id: String,     // 物料ID
    pub quantity_per_unit: f64,  // 单位产品用量
    pub unit: String,            // 计量单位 (仅展示)
    #[serde(rename = "type")]
    pub component_type: String,  // 类型, 如 Standard/Premium (仅展示)
}

impl From<BomRecord> for BomComponent {
    fn from(record: BomRecord) -> Self {
        Self {
            material_id: record.material_id,
            quantity_per_unit: record.quantity_per_unit,
            unit: record.unit,
            component_type: record.component_type,
        }
    }
}
