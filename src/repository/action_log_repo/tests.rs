use super::ActionLogRepository;
use crate::domain::action_log::{ActionLog, ActionType};
use rusqlite::Connection;
use serde_json::json;
use std::sync::{Arc, Mutex};

fn setup_test_db() -> Arc<Mutex<Connection>> {
    let conn = Connection::open_in_memory().unwrap();
    crate::db::configure_sqlite_connection(&conn).unwrap();
    crate::db::init_schema(&conn).unwrap();
    Arc::new(Mutex::new(conn))
}

#[test]
fn test_insert_and_find_by_id() {
    let repo = ActionLogRepository::new(setup_test_db());

    let log = ActionLog::now(ActionType::Allocate, "user1", Some("L1"))
        .with_payload(json!({"granted_qty": 30}))
        .with_detail("分配 30");
    let action_id = repo.insert(&log).unwrap();
    assert_eq!(action_id, log.action_id);

    let found = repo.find_by_id(&action_id).unwrap().unwrap();
    assert_eq!(found.action_type, "Allocate");
    assert_eq!(found.actor, "user1");
    assert_eq!(found.entity_id.as_deref(), Some("L1"));
    assert_eq!(found.payload_json.unwrap()["granted_qty"], 30);
    assert_eq!(found.action_ts, log.action_ts);
}

#[test]
fn test_find_by_id_missing() {
    let repo = ActionLogRepository::new(setup_test_db());
    assert!(repo.find_by_id("nope").unwrap().is_none());
}

#[test]
fn test_batch_insert_and_queries() {
    let repo = ActionLogRepository::new(setup_test_db());

    let logs = vec![
        ActionLog::now(ActionType::Allocate, "u1", Some("L1")),
        ActionLog::now(ActionType::AllocateRejected, "u1", Some("L1")),
        ActionLog::now(ActionType::ReleaseProduction, "u2", Some("PO1")),
    ];
    assert_eq!(repo.batch_insert(&logs).unwrap(), 3);

    assert_eq!(repo.find_by_entity_id("L1").unwrap().len(), 2);
    assert_eq!(repo.find_by_action_type("ReleaseProduction", 10).unwrap().len(), 1);
    assert_eq!(repo.find_recent(2).unwrap().len(), 2);
}
