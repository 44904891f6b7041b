// ==========================================
// 生产可行性核心 - 库存快照
// ==========================================
// 职责: material_id → 可用量（某一时刻的只读快照）
// 规则: 未知物料按 0 处理（缺货），不是错误
// 说明: 取数失败由数据层单独报错，不能折算为 0
// ==========================================

use crate::domain::inventory::InventoryRecord;
use crate::engine::error::{EngineError, EngineResult};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct InventorySnapshot {
    available: HashMap<String, f64>,
}

impl InventorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// 由边界记录构建快照
    ///
    /// 同一物料出现多行（如多库位）时累加
    pub fn from_records<I>(records: I) -> EngineResult<Self>
    where
        I: IntoIterator<Item = InventoryRecord>,
    {
        let mut snapshot = Self::new();
        for record in records {
            snapshot.add(record)?;
        }
        Ok(snapshot)
    }

    pub fn add(&mut self, record: InventoryRecord) -> EngineResult<()> {
        if !record.available.is_finite() || record.available < 0.0 {
            return Err(EngineError::InvalidInventoryLevel {
                material_id: record.material_id,
                available: record.available,
            });
        }
        *self.available.entry(record.material_id).or_insert(0.0) += record.available;
        Ok(())
    }

    /// 查询物料可用量，未知物料返回 0
    pub fn available_of(&self, material_id: &str) -> f64 {
        self.available.get(material_id).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, material_id: &str) -> bool {
        self.available.contains_key(material_id)
    }

    pub fn len(&self) -> usize {
        self.available.len()
    }

    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }
}
