// ==========================================
// 引擎性质测试
// ==========================================
// 职责: 在参数网格上验证可行性判定与分配计划的不变量
// ==========================================

mod test_helpers;

use erp_production_core::domain::{AllocationDecisionKind, AllocationState};
use erp_production_core::engine::{
    AllocationPlanner, BomIndex, EngineError, FeasibilityEvaluator, InventorySnapshot,
};
use test_helpers::{bom, stock};

fn sample_index() -> BomIndex {
    BomIndex::from_records(vec![
        bom("P1", "materialA", 2.0),
        bom("P1", "materialB", 1.0),
        bom("P2", "materialA", 0.25),
        bom("P2", "materialC", 3.0),
    ])
    .unwrap()
}

fn line(ordered: i64, allocated: i64) -> AllocationState {
    AllocationState {
        allocated_qty: allocated,
        ..AllocationState::new_line("L1", "SO1", "P1", ordered)
    }
}

#[test]
fn test_evaluate_is_deterministic() {
    let index = sample_index();
    let inventory =
        InventorySnapshot::from_records(vec![stock("materialA", 7.0), stock("materialC", 30.0)])
            .unwrap();
    let evaluator = FeasibilityEvaluator::default();

    for product in ["P1", "P2", "P3"] {
        for qty in [1.0, 3.0, 10.0, 100.0] {
            let first = evaluator.evaluate(product, qty, &index, &inventory).unwrap();
            let second = evaluator.evaluate(product, qty, &index, &inventory).unwrap();
            assert_eq!(first, second, "product={} qty={}", product, qty);
        }
    }
}

#[test]
fn test_sufficiency_matches_definition() {
    let index = sample_index();
    let evaluator = FeasibilityEvaluator::default();

    for available in [0.0, 1.0, 2.5, 20.0, 29.0, 30.0, 1000.0] {
        let inventory = InventorySnapshot::from_records(vec![
            stock("materialA", available),
            stock("materialB", available),
            stock("materialC", available),
        ])
        .unwrap();

        for product in ["P1", "P2"] {
            for qty in [1.0, 10.0] {
                let report = evaluator.evaluate(product, qty, &index, &inventory).unwrap();
                for (verdict, component) in report.verdicts.iter().zip(index.lookup(product)) {
                    let required = component.quantity_per_unit * qty;
                    assert_eq!(verdict.required, required);
                    assert_eq!(verdict.is_sufficient, available >= required);
                }
                assert_eq!(
                    report.overall_sufficient,
                    report.verdicts.iter().all(|v| v.is_sufficient)
                );
            }
        }
    }
}

#[test]
fn test_feasible_and_insufficient_scenarios() {
    let index = sample_index();
    let evaluator = FeasibilityEvaluator::default();

    let plenty =
        InventorySnapshot::from_records(vec![stock("materialA", 100.0), stock("materialB", 100.0)])
            .unwrap();
    let report = evaluator.evaluate("P1", 10.0, &index, &plenty).unwrap();
    assert!(report.overall_sufficient);
    assert_eq!(report.verdicts[0].material_id, "materialA");
    assert_eq!(report.verdicts[0].required, 20.0);
    assert_eq!(report.verdicts[1].required, 10.0);

    let short =
        InventorySnapshot::from_records(vec![stock("materialA", 5.0), stock("materialB", 100.0)])
            .unwrap();
    let report = evaluator.evaluate("P1", 10.0, &index, &short).unwrap();
    assert!(!report.verdicts[0].is_sufficient);
    assert!(report.verdicts[1].is_sufficient);
    assert!(!report.overall_sufficient);
}

#[test]
fn test_batch_continues_past_failures() {
    let index = sample_index();
    let inventory = InventorySnapshot::new();
    let evaluator = FeasibilityEvaluator::default();

    let results = evaluator.evaluate_batch(
        &[
            erp_production_core::domain::FeasibilityRequest {
                product_id: "P1".to_string(),
                requested_qty: -1.0,
            },
            erp_production_core::domain::FeasibilityRequest {
                product_id: "P2".to_string(),
                requested_qty: 1.0,
            },
        ],
        &index,
        &inventory,
    );

    assert!(matches!(results[0], Err(EngineError::InvalidQuantity { .. })));
    let second = results[1].as_ref().unwrap();
    assert!(!second.overall_sufficient);
}

#[test]
fn test_grant_never_exceeds_bounds() {
    let planner = AllocationPlanner::new();

    for ordered in [0_i64, 1, 10, 100] {
        for allocated in 0..=ordered.min(12) {
            for requested in [0_i64, 1, 5, 50, 500] {
                for stock in [-3_i64, 0, 1, 7, 1000] {
                    let state = line(ordered, allocated);
                    let decision = planner.plan_increment(&state, requested, stock).unwrap();
                    let bound = requested.min(ordered - allocated).min(stock.max(0));

                    assert!(decision.granted_qty >= 0);
                    assert!(decision.granted_qty <= bound);
                    match decision.decision_kind {
                        AllocationDecisionKind::Full => {
                            assert_eq!(decision.granted_qty, requested)
                        }
                        AllocationDecisionKind::Partial => assert_eq!(
                            decision.shortfall,
                            Some(requested - decision.granted_qty)
                        ),
                        AllocationDecisionKind::Rejected => {
                            assert_eq!(decision.granted_qty, 0);
                            assert!(decision.reason.is_some());
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn test_allocation_is_monotonic() {
    let planner = AllocationPlanner::new();
    let mut state = line(100, 0);

    for (requested, stock) in [(30, 50), (50, 20), (0, 10), (40, 100), (40, 100), (10, 0)] {
        let before = state.allocated_qty;
        let decision = planner.plan_increment(&state, requested, stock).unwrap();
        state = planner.apply(&state, &decision).unwrap();
        assert!(state.allocated_qty >= before);
        assert!(state.allocated_qty <= state.ordered_qty);
    }
    assert_eq!(state.allocated_qty, 100);
}

#[test]
fn test_allocation_scenarios() {
    let planner = AllocationPlanner::new();

    let partial = planner.plan_increment(&line(100, 60), 50, 30).unwrap();
    assert_eq!(partial.granted_qty, 30);
    assert_eq!(partial.decision_kind, AllocationDecisionKind::Partial);
    assert_eq!(partial.shortfall, Some(20));

    let rejected = planner.plan_increment(&line(100, 100), 10, 50).unwrap();
    assert_eq!(rejected.decision_kind, AllocationDecisionKind::Rejected);
    assert_eq!(rejected.reason.as_deref(), Some("already fully allocated"));

    let invalid = planner.plan_increment(&line(100, 0), -5, 50).unwrap_err();
    assert_eq!(invalid, EngineError::InvalidIncrement { value: -5 });
}
