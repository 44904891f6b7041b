// ==========================================
// 生产 API 集成测试
// ==========================================
// 测试目标: 可行性判定、空 BOM 策略、生产下达与完工的库存效果
// ==========================================

mod test_helpers;

use erp_production_core::api::ApiError;
use erp_production_core::config::config_keys;
use erp_production_core::domain::{FeasibilityRequest, ProductionOrderStatus};
use erp_production_core::repository::{BomRepository, InventoryRepository};
use test_helpers::{
    block_action_log, bom, create_test_state, open_shared_connection, seed_table_scenario, stock,
};

#[tokio::test]
async fn test_check_feasibility_reports_each_component() {
    let (_temp, state) = create_test_state().expect("Failed to create state");
    seed_table_scenario(&state, 10.0, 5.0).unwrap();

    let report = state.production_api.check_feasibility("P1", 3.0).await.unwrap();

    assert!(report.bom_defined);
    assert_eq!(report.requested_qty, 3);
    assert_eq!(report.verdicts.len(), 2);
    assert_eq!(report.verdicts[0].material_id, "M1");
    assert_eq!(report.verdicts[0].required, 12.0);
    assert!(!report.verdicts[0].is_sufficient);
    assert_eq!(report.verdicts[0].shortage, 2.0);
    assert!(report.verdicts[1].is_sufficient);
    assert!(!report.overall_sufficient);
}

#[tokio::test]
async fn test_invalid_quantity_is_rejected() {
    let (_temp, state) = create_test_state().expect("Failed to create state");
    seed_table_scenario(&state, 10.0, 5.0).unwrap();

    for qty in [0.0, -1.0, 1.5, f64::NAN] {
        let err = state.production_api.check_feasibility("P1", qty).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)), "qty={}", qty);
    }
}

#[tokio::test]
async fn test_empty_bom_policy_is_configurable() {
    let (_temp, state) = create_test_state().expect("Failed to create state");

    let report = state.production_api.check_feasibility("P404", 1.0).await.unwrap();
    assert!(!report.bom_defined);
    assert!(!report.overall_sufficient);

    state
        .config_manager
        .set_config_value(config_keys::EMPTY_BOM_POLICY, "FEASIBLE")
        .unwrap();
    let report = state.production_api.check_feasibility("P404", 1.0).await.unwrap();
    assert!(!report.bom_defined);
    assert!(report.overall_sufficient);
}

#[tokio::test]
async fn test_batch_reports_per_item_outcomes() {
    let (_temp, state) = create_test_state().expect("Failed to create state");
    seed_table_scenario(&state, 40.0, 10.0).unwrap();

    let outcomes = state
        .production_api
        .check_feasibility_batch(&[
            FeasibilityRequest {
                product_id: "P1".to_string(),
                requested_qty: 10.0,
            },
            FeasibilityRequest {
                product_id: "P1".to_string(),
                requested_qty: -2.0,
            },
            FeasibilityRequest {
                product_id: "P1".to_string(),
                requested_qty: 11.0,
            },
        ])
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].feasibility.as_ref().unwrap().overall_sufficient);
    assert!(outcomes[1].feasibility.is_none());
    assert!(outcomes[1].error.is_some());
    assert!(!outcomes[2].feasibility.as_ref().unwrap().overall_sufficient);
}

#[tokio::test]
async fn test_release_consumes_and_complete_receives() {
    let (_temp, state) = create_test_state().expect("Failed to create state");
    seed_table_scenario(&state, 10.0, 5.0).unwrap();

    let order = state
        .production_api
        .release_production("P1", 2.0, Some("planner"))
        .await
        .unwrap();
    assert_eq!(order.status, ProductionOrderStatus::Released);
    assert_eq!(order.created_by, "planner");
    assert_eq!(
        state
            .production_api
            .get_production_order(&order.production_order_id)
            .unwrap()
            .quantity,
        2
    );

    let legs = state.inventory_repo.find_by_material("M1").unwrap().unwrap();
    let tops = state.inventory_repo.find_by_material("M2").unwrap().unwrap();
    assert_eq!(legs.available, 2.0);
    assert_eq!(tops.available, 3.0);
    assert!(state.inventory_repo.find_by_material("P1").unwrap().is_none());

    let done = state
        .production_api
        .complete_production(&order.production_order_id, None)
        .await
        .unwrap();
    assert_eq!(done.status, ProductionOrderStatus::Completed);
    assert_eq!(
        state.inventory_repo.find_by_material("P1").unwrap().unwrap().available,
        2.0
    );

    let logs = state
        .action_log_repo
        .find_by_entity_id(&order.production_order_id)
        .unwrap();
    let mut types: Vec<_> = logs.iter().map(|l| l.action_type.as_str()).collect();
    types.sort();
    assert_eq!(types, vec!["CompleteProduction", "ReleaseProduction"]);

    let err = state
        .production_api
        .complete_production(&order.production_order_id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidStateTransition { .. }));
}

#[tokio::test]
async fn test_infeasible_release_changes_nothing() {
    let (_temp, state) = create_test_state().expect("Failed to create state");
    seed_table_scenario(&state, 3.0, 5.0).unwrap();

    let err = state
        .production_api
        .release_production("P1", 1.0, None)
        .await
        .unwrap_err();
    match err {
        ApiError::ProductionInfeasible { short_materials, .. } => {
            assert_eq!(short_materials, vec!["M1".to_string()])
        }
        other => panic!("unexpected error: {:?}", other),
    }

    assert_eq!(
        state.inventory_repo.find_by_material("M2").unwrap().unwrap().available,
        5.0
    );
    assert!(state.production_api.list_production_orders("P1").unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_production_order_not_found() {
    let (_temp, state) = create_test_state().expect("Failed to create state");
    let err = state.production_api.get_production_order("PO404").unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_repeated_material_passes_check_but_release_conflicts() {
    let (_temp, state) = create_test_state().expect("Failed to create state");
    let conn = open_shared_connection(&state.db_path).unwrap();
    BomRepository::new(conn.clone())
        .import_records(&[bom("P1", "M1", 5.0), bom("P1", "M1", 5.0)])
        .unwrap();
    InventoryRepository::new(conn)
        .import_records(&[stock("M1", 8.0)])
        .unwrap();

    // 每行单独判定，不做合计复核
    let report = state.production_api.check_feasibility("P1", 1.0).await.unwrap();
    assert_eq!(report.verdicts.len(), 2);
    assert!(report.overall_sufficient);

    let err = state
        .production_api
        .release_production("P1", 1.0, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::StockConflict(_)), "{:?}", err);

    assert!(state.production_api.list_production_orders("P1").unwrap().is_empty());
    assert_eq!(
        state.inventory_repo.find_by_material("M1").unwrap().unwrap().available,
        8.0
    );
}

#[tokio::test]
async fn test_release_succeeds_when_action_log_fails() {
    let (_temp, state) = create_test_state().expect("Failed to create state");
    seed_table_scenario(&state, 10.0, 5.0).unwrap();
    block_action_log(&state.db_path).unwrap();

    let order = state
        .production_api
        .release_production("P1", 2.0, None)
        .await
        .unwrap();
    assert_eq!(state.production_api.list_production_orders("P1").unwrap().len(), 1);
    assert_eq!(
        state.inventory_repo.find_by_material("M1").unwrap().unwrap().available,
        2.0
    );

    let done = state
        .production_api
        .complete_production(&order.production_order_id, None)
        .await
        .unwrap();
    assert_eq!(done.status, ProductionOrderStatus::Completed);
    assert!(state
        .action_log_repo
        .find_by_entity_id(&order.production_order_id)
        .unwrap()
        .is_empty());
}
