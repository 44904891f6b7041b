// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================

use erp_production_core::app::AppState;
use erp_production_core::domain::{BomRecord, InventoryRecord};
use rusqlite::Connection;
use std::error::Error;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = open_test_connection(&db_path)?;
    erp_production_core::db::init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试连接（应用统一 PRAGMA）
pub fn open_test_connection(db_path: &str) -> Result<Connection, Box<dyn Error>> {
    Ok(erp_production_core::db::open_sqlite_connection(db_path)?)
}

/// 打开共享连接（供多个仓储使用）
pub fn open_shared_connection(db_path: &str) -> Result<Arc<Mutex<Connection>>, Box<dyn Error>> {
    Ok(Arc::new(Mutex::new(open_test_connection(db_path)?)))
}

/// 创建完整应用状态
pub fn create_test_state() -> Result<(NamedTempFile, AppState), Box<dyn Error>> {
    let (temp_file, db_path) = create_test_db()?;
    let state = AppState::new(db_path)?;
    Ok((temp_file, state))
}

/// 写入临时 CSV 文件（带 .csv 后缀）
pub fn write_csv(lines: &[&str]) -> Result<NamedTempFile, Box<dyn Error>> {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile()?;
    for line in lines {
        writeln!(file, "{}", line)?;
    }
    file.flush()?;
    Ok(file)
}

pub fn bom(product_id: &str, material_id: &str, quantity_per_unit: f64) -> BomRecord {
    BomRecord {
        product_id: product_id.to_string(),
        material_id: material_id.to_string(),
        quantity_per_unit,
        unit: "pcs".to_string(),
        component_type: "Standard".to_string(),
    }
}

pub fn stock(material_id: &str, available: f64) -> InventoryRecord {
    InventoryRecord {
        material_id: material_id.to_string(),
        available,
    }
}

/// 标准场景: 桌子 P1 = 4 条腿 M1 + 1 块桌面 M2
pub fn seed_table_scenario(
    state: &AppState,
    legs: f64,
    tops: f64,
) -> Result<(), Box<dyn Error>> {
    let conn = open_shared_connection(&state.db_path)?;
    erp_production_core::repository::BomRepository::new(conn.clone())
        .import_records(&[bom("P1", "M1", 4.0), bom("P1", "M2", 1.0)])?;
    erp_production_core::repository::InventoryRepository::new(conn)
        .import_records(&[stock("M1", legs), stock("M2", tops)])?;
    Ok(())
}

/// 使 action_log 写入失败（模拟日志表不可用）
pub fn block_action_log(db_path: &str) -> Result<(), Box<dyn Error>> {
    let conn = open_test_connection(db_path)?;
    conn.execute_batch(
        r#"
        CREATE TRIGGER block_action_log BEFORE INSERT ON action_log
        BEGIN
            SELECT RAISE(ABORT, 'action_log unavailable');
        END;
        "#,
    )?;
    Ok(())
}
