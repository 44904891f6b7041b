// ==========================================
// 生产可行性核心 - 可行性评估引擎
// ==========================================
// 输入: product_id + requested_qty + BOM 索引 + 库存快照
// 输出: 逐物料判定 + 总体可行性
// 红线: 纯函数，不读写库，相同输入相同输出
// ==========================================

use crate::domain::bom::BomComponent;
use crate::domain::feasibility::{FeasibilityRequest, FeasibilityVerdict, ProductionFeasibility};
use crate::domain::types::EmptyBomPolicy;
use crate::engine::bom_index::BomIndex;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::inventory_snapshot::InventorySnapshot;
use tracing::{debug, instrument};

/// f64 可精确表示的最大整数
const MAX_EXACT_QTY: f64 = 9_007_199_254_740_992.0;

// ==========================================
// FeasibilityEvaluator - 可行性评估引擎
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct FeasibilityEvaluator {
    empty_bom_policy: EmptyBomPolicy,
}

impl FeasibilityEvaluator {
    /// 创建评估引擎
    ///
    /// # 参数
    /// - empty_bom_policy: 产品未定义 BOM 时的判定策略
    pub fn new(empty_bom_policy: EmptyBomPolicy) -> Self {
        Self { empty_bom_policy }
    }

    /// 评估单个产品的生产可行性
    ///
    /// # 规则
    /// - requested_qty 必须为正整数，否则 InvalidQuantity
    /// - required = quantity_per_unit × requested_qty
    /// - is_sufficient = available >= required
    /// - overall_sufficient = 所有判定的逻辑与
    /// - 空 BOM: 按 empty_bom_policy 判定，bom_defined=false
    #[instrument(skip(self, bom_index, inventory), fields(policy = %self.empty_bom_policy))]
    pub fn evaluate(
        &self,
        product_id: &str,
        requested_qty: f64,
        bom_index: &BomIndex,
        inventory: &InventorySnapshot,
    ) -> EngineResult<ProductionFeasibility> {
        let qty = Self::validate_requested_qty(requested_qty)?;
        let components = bom_index.lookup(product_id);

        let verdicts: Vec<FeasibilityVerdict> = components
            .iter()
            .map(|component| Self::judge_component(component, qty, inventory))
            .collect();

        let bom_defined = !components.is_empty();
        let overall_sufficient = if bom_defined {
            verdicts.iter().all(|v| v.is_sufficient)
        } else {
            matches!(self.empty_bom_policy, EmptyBomPolicy::Feasible)
        };

        debug!(
            component_count = verdicts.len(),
            overall_sufficient,
            bom_defined,
            "可行性评估完成"
        );

        Ok(ProductionFeasibility {
            product_id: product_id.to_string(),
            requested_qty: qty,
            verdicts,
            overall_sufficient,
            bom_defined,
        })
    }

    /// 批量评估
    ///
    /// 单个请求失败不影响其他请求，结果与输入一一对应
    pub fn evaluate_batch(
        &self,
        requests: &[FeasibilityRequest],
        bom_index: &BomIndex,
        inventory: &InventorySnapshot,
    ) -> Vec<EngineResult<ProductionFeasibility>> {
        requests
            .iter()
            .map(|req| self.evaluate(&req.product_id, req.requested_qty, bom_index, inventory))
            .collect()
    }

    /// 校验生产数量: 有限、正、整数
    pub fn validate_requested_qty(requested_qty: f64) -> EngineResult<i64> {
        if !requested_qty.is_finite()
            || requested_qty <= 0.0
            || requested_qty.fract() != 0.0
            || requested_qty > MAX_EXACT_QTY
        {
            return Err(EngineError::InvalidQuantity {
                value: requested_qty.to_string(),
            });
        }
        Ok(requested_qty as i64)
    }

    /// 单物料判定
    pub fn judge_component(
        component: &BomComponent,
        requested_qty: i64,
        inventory: &InventorySnapshot,
    ) -> FeasibilityVerdict {
        let required = component.quantity_per_unit * requested_qty as f64;
        let available = inventory.available_of(&component.material_id);
        FeasibilityVerdict {
            material_id: component.material_id.clone(),
            unit: component.unit.clone(),
            required,
            available,
            is_sufficient: available >= required,
            shortage: (required - available).max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bom::BomRecord;
    use crate::domain::inventory::InventoryRecord;

    fn bom(rows: &[(&str, &str, f64)]) -> BomIndex {
        BomIndex::from_records(rows.iter().map(|(p, m, q)| BomRecord {
            product_id: p.to_string(),
            material_id: m.to_string(),
            quantity_per_unit: *q,
            unit: "kg".to_string(),
            component_type: "Standard".to_string(),
        }))
        .unwrap()
    }

    fn stock(rows: &[(&str, f64)]) -> InventorySnapshot {
        InventorySnapshot::from_records(rows.iter().map(|(m, a)| InventoryRecord {
            material_id: m.to_string(),
            available: *a,
        }))
        .unwrap()
    }

    // ==========================================
    // 测试 1: 数量校验
    // ==========================================

    #[test]
    fn test_validate_requested_qty() {
        assert_eq!(FeasibilityEvaluator::validate_requested_qty(10.0), Ok(10));
        for bad in [0.0, -3.0, 2.5, f64::NAN, f64::INFINITY, 1e300] {
            assert!(
                matches!(
                    FeasibilityEvaluator::validate_requested_qty(bad),
                    Err(EngineError::InvalidQuantity { .. })
                ),
                "{} 应判定为无效数量",
                bad
            );
        }
    }

    // ==========================================
    // 测试 2: 可行 / 不可行
    // ==========================================

    #[test]
    fn test_feasible_scenario() {
        let index = bom(&[("P1", "materialA", 2.0), ("P1", "materialB", 1.0)]);
        let inventory = stock(&[("materialA", 100.0), ("materialB", 100.0)]);

        let report = FeasibilityEvaluator::default()
            .evaluate("P1", 10.0, &index, &inventory)
            .unwrap();

        assert_eq!(report.requested_qty, 10);
        assert_eq!(report.verdicts.len(), 2);
        assert_eq!(report.verdicts[0].material_id, "materialA");
        assert_eq!(report.verdicts[0].required, 20.0);
        assert_eq!(report.verdicts[0].available, 100.0);
        assert!(report.verdicts[0].is_sufficient);
        assert_eq!(report.verdicts[1].required, 10.0);
        assert!(report.verdicts[1].is_sufficient);
        assert!(report.overall_sufficient);
        assert!(report.bom_defined);
    }

    #[test]
    fn test_insufficient_scenario() {
        let index = bom(&[("P1", "materialA", 2.0), ("P1", "materialB", 1.0)]);
        let inventory = stock(&[("materialA", 5.0), ("materialB", 100.0)]);

        let report = FeasibilityEvaluator::default()
            .evaluate("P1", 10.0, &index, &inventory)
            .unwrap();

        assert!(!report.verdicts[0].is_sufficient);
        assert_eq!(report.verdicts[0].shortage, 15.0);
        assert!(report.verdicts[1].is_sufficient);
        assert!(!report.overall_sufficient);
    }

    #[test]
    fn test_exact_match_is_sufficient() {
        let index = bom(&[("P1", "M1", 2.0)]);
        let inventory = stock(&[("M1", 20.0)]);
        let report = FeasibilityEvaluator::default()
            .evaluate("P1", 10.0, &index, &inventory)
            .unwrap();
        assert!(report.overall_sufficient);
        assert_eq!(report.verdicts[0].shortage, 0.0);
    }

    #[test]
    fn test_missing_material_counts_as_zero() {
        let index = bom(&[("P1", "M1", 1.0)]);
        let report = FeasibilityEvaluator::default()
            .evaluate("P1", 1.0, &index, &InventorySnapshot::new())
            .unwrap();
        assert_eq!(report.verdicts[0].available, 0.0);
        assert!(!report.overall_sufficient);
    }

    // ==========================================
    // 测试 3: 空 BOM 策略
    // ==========================================

    #[test]
    fn test_empty_bom_default_is_infeasible() {
        let report = FeasibilityEvaluator::default()
            .evaluate("P404", 1.0, &BomIndex::new(), &InventorySnapshot::new())
            .unwrap();
        assert!(report.verdicts.is_empty());
        assert!(!report.bom_defined);
        assert!(!report.overall_sufficient);
    }

    #[test]
    fn test_empty_bom_feasible_policy() {
        let report = FeasibilityEvaluator::new(EmptyBomPolicy::Feasible)
            .evaluate("P404", 1.0, &BomIndex::new(), &InventorySnapshot::new())
            .unwrap();
        assert!(report.verdicts.is_empty());
        assert!(!report.bom_defined);
        assert!(report.overall_sufficient);
    }

    // ==========================================
    // 测试 4: 批量评估
    // ==========================================

    #[test]
    fn test_batch_continues_past_failures() {
        let index = bom(&[("P1", "M1", 1.0)]);
        let inventory = stock(&[("M1", 5.0)]);
        let requests = vec![
            FeasibilityRequest { product_id: "P1".to_string(), requested_qty: 5.0 },
            FeasibilityRequest { product_id: "P1".to_string(), requested_qty: -1.0 },
            FeasibilityRequest { product_id: "P1".to_string(), requested_qty: 6.0 },
        ];

        let results = FeasibilityEvaluator::default().evaluate_batch(&requests, &index, &inventory);
        assert_eq!(results.len(), 3);
        assert!(results[0].as_ref().unwrap().overall_sufficient);
        assert!(matches!(results[1], Err(EngineError::InvalidQuantity { .. })));
        assert!(!results[2].as_ref().unwrap().overall_sufficient);
    }
}
