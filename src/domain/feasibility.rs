// ==========================================
// 生产可行性核心 - 可行性报告领域模型
// ==========================================

use crate::domain::inventory::InventoryDelta;
use serde::{Deserialize, Serialize};

// ==========================================
// FeasibilityVerdict - 单物料判定
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeasibilityVerdict {
    pub material_id: String,
    pub unit: String,         // 计量单位 (仅展示)
    pub required: f64,        // quantity_per_unit × requested_qty
    pub available: f64,       // 快照可用量
    pub is_sufficient: bool,  // available >= required
    pub shortage: f64,        // max(0, required - available)
}

// ==========================================
// ProductionFeasibility - 生产可行性报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionFeasibility {
    pub product_id: String,
    pub requested_qty: i64,
    pub verdicts: Vec<FeasibilityVerdict>,
    pub overall_sufficient: bool,
    /// 产品是否定义了 BOM（空 BOM 需显式暴露给调用方）
    pub bom_defined: bool,
}

impl ProductionFeasibility {
    /// 不足的物料判定
    pub fn insufficient(&self) -> impl Iterator<Item = &FeasibilityVerdict> {
        self.verdicts.iter().filter(|v| !v.is_sufficient)
    }

    /// 执行该生产将产生的物料消耗（负数）
    ///
    /// 同一物料在多行 BOM 中出现时合并为一条
    pub fn consumption(&self) -> Vec<InventoryDelta> {
        let mut deltas: Vec<InventoryDelta> = Vec::with_capacity(self.verdicts.len());
        for verdict in &self.verdicts {
            match deltas.iter_mut().find(|d| d.material_id == verdict.material_id) {
                Some(delta) => delta.quantity -= verdict.required,
                None => deltas.push(InventoryDelta {
                    material_id: verdict.material_id.clone(),
                    quantity: -verdict.required,
                }),
            }
        }
        deltas
    }
}

// ==========================================
// FeasibilityRequest - 批量评估请求
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeasibilityRequest {
    pub product_id: String,
    pub requested_qty: f64,
}
