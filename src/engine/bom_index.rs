// ==========================================
// 生产可行性核心 - BOM 索引
// ==========================================
// 职责: product_id → 有序 BOM 行
// 红线: 只读，无副作用
// ==========================================

use crate::domain::bom::{BomComponent, BomRecord};
use crate::engine::error::{EngineError, EngineResult};
use std::collections::HashMap;

// ==========================================
// BomIndex - BOM 索引
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct BomIndex {
    by_product: HashMap<String, Vec<BomComponent>>,
}

impl BomIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// 由边界记录构建索引
    ///
    /// # 规则
    /// - 同一产品的行保持输入顺序
    /// - quantity_per_unit 必须为有限非负数，否则整体失败
    pub fn from_records<I>(records: I) -> EngineResult<Self>
    where
        I: IntoIterator<Item = BomRecord>,
    {
        let mut index = Self::new();
        for record in records {
            index.insert(record)?;
        }
        Ok(index)
    }

    /// 插入一行 BOM
    pub fn insert(&mut self, record: BomRecord) -> EngineResult<()> {
        validate_quantity_per_unit(&record)?;
        let product_id = record.product_id.clone();
        self.by_product
            .entry(product_id)
            .or_default()
            .push(BomComponent::from(record));
        Ok(())
    }

    /// 查询产品的 BOM
    ///
    /// 未定义 BOM 的产品返回空切片（不是错误）
    pub fn lookup(&self, product_id: &str) -> &[BomComponent] {
        self.by_product
            .get(product_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 产品是否定义了 BOM
    pub fn has_bom(&self, product_id: &str) -> bool {
        !self.lookup(product_id).is_empty()
    }

    /// 已定义 BOM 的产品数
    pub fn product_count(&self) -> usize {
        self.by_product.len()
    }
}

fn validate_quantity_per_unit(record: &BomRecord) -> EngineResult<()> {
    let qty = record.quantity_per_unit;
    if !qty.is_finite() || qty < 0.0 {
        return Err(EngineError::InvalidBomComponent {
            product_id: record.product_id.clone(),
            material_id: record.material_id.clone(),
            message: format!("quantity_per_unit={} 必须为非负数", qty),
        });
    }
    Ok(())
}
