// ==========================================
// 生产可行性核心 - 库存数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 红线: 扣减必须带 available >= qty 条件（不允许负库存）
// ==========================================

use crate::domain::inventory::{InventoryDelta, InventoryLevel, InventoryRecord};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// 浮点比较容差
const QTY_EPSILON: f64 = 1e-9;

pub struct InventoryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl InventoryRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 导入库存记录（覆盖可用量）
    ///
    /// 同一物料多行时先累加再写入；整体单事务
    pub fn import_records(&self, records: &[InventoryRecord]) -> RepositoryResult<usize> {
        let mut merged: BTreeMap<&str, f64> = BTreeMap::new();
        for record in records {
            *merged.entry(record.material_id.as_str()).or_insert(0.0) += record.available;
        }

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        for (material_id, available) in &merged {
            tx.execute(
                r#"
                INSERT INTO inventory_level (material_id, available, revision, updated_at)
                VALUES (?1, ?2, 0, datetime('now'))
                ON CONFLICT(material_id) DO UPDATE SET
                    available = excluded.available,
                    revision = revision + 1,
                    updated_at = datetime('now')
                "#,
                params![material_id, available],
            )?;
        }
        tx.commit()?;

        Ok(merged.len())
    }

    /// 查询单个物料库存
    pub fn find_by_material(&self, material_id: &str) -> RepositoryResult<Option<InventoryLevel>> {
        let conn = self.get_conn()?;
        find_with(&conn, material_id)
    }

    /// 查询全部库存（按物料ID）
    pub fn list_all(&self) -> RepositoryResult<Vec<InventoryLevel>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            "SELECT material_id, available, revision FROM inventory_level ORDER BY material_id",
        )?;

        let levels = stmt
            .query_map([], |row| {
                Ok(InventoryLevel {
                    material_id: row.get(0)?,
                    available: row.get(1)?,
                    revision: row.get(2)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(levels)
    }

    /// 读取库存快照记录（用于构建 InventorySnapshot）
    pub fn snapshot_records(&self) -> RepositoryResult<Vec<InventoryRecord>> {
        Ok(self.list_all()?.iter().map(InventoryRecord::from).collect())
    }

    /// 入库（物料不存在时新建）
    pub fn receive(&self, material_id: &str, quantity: f64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        receive_with(&conn, material_id, quantity)?;
        Ok(())
    }
}

pub(crate) fn find_with(
    conn: &Connection,
    material_id: &str,
) -> RepositoryResult<Option<InventoryLevel>> {
    let level = conn
        .query_row(
            "SELECT material_id, available, revision FROM inventory_level WHERE material_id = ?1",
            params![material_id],
            |row| {
                Ok(InventoryLevel {
                    material_id: row.get(0)?,
                    available: row.get(1)?,
                    revision: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(level)
}

pub(crate) fn receive_with(conn: &Connection, material_id: &str, quantity: f64) -> RepositoryResult<()> {
    if !quantity.is_finite() || quantity < 0.0 {
        return Err(RepositoryError::FieldValueError {
            field: "quantity".to_string(),
            message: format!("入库数量必须为非负数: {}", quantity),
        });
    }
    conn.execute(
        r#"
        INSERT INTO inventory_level (material_id, available, revision, updated_at)
        VALUES (?1, ?2, 0, datetime('now'))
        ON CONFLICT(material_id) DO UPDATE SET
            available = available + excluded.available,
            revision = revision + 1,
            updated_at = datetime('now')
        "#,
        params![material_id, quantity],
    )?;
    Ok(())
}

/// 条件扣减: 仅当 available >= quantity 时生效
pub(crate) fn consume_with(conn: &Connection, material_id: &str, quantity: f64) -> RepositoryResult<()> {
    if quantity <= 0.0 {
        return Ok(());
    }

    let rows = conn.execute(
        r#"
        UPDATE inventory_level
        SET available = MAX(available - ?2, 0),
            revision = revision + 1,
            updated_at = datetime('now')
        WHERE material_id = ?1 AND available + ?3 >= ?2
        "#,
        params![material_id, quantity, QTY_EPSILON],
    )?;

    if rows == 0 {
        let available = find_with(conn, material_id)?
            .map(|level| level.available)
            .unwrap_or(0.0);
        return Err(RepositoryError::StockConflict {
            material_id: material_id.to_string(),
            requested: quantity,
            available,
        });
    }
    Ok(())
}

pub(crate) fn apply_deltas_with(conn: &Connection, deltas: &[InventoryDelta]) -> RepositoryResult<()> {
    for delta in deltas {
        if delta.quantity < 0.0 {
            consume_with(conn, &delta.material_id, -delta.quantity)?;
        } else if delta.quantity > 0.0 {
            receive_with(conn, &delta.material_id, delta.quantity)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> InventoryRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        InventoryRepository::new(Arc::new(Mutex::new(conn)))
    }

    fn record(material_id: &str, available: f64) -> InventoryRecord {
        InventoryRecord {
            material_id: material_id.to_string(),
            available,
        }
    }

    fn delta(material_id: &str, quantity: f64) -> InventoryDelta {
        InventoryDelta {
            material_id: material_id.to_string(),
            quantity,
        }
    }

    fn apply_in_tx(repo: &InventoryRepository, deltas: &[InventoryDelta]) -> RepositoryResult<()> {
        let mut conn = repo.get_conn()?;
        let tx = conn.transaction()?;
        apply_deltas_with(&tx, deltas)?;
        tx.commit()?;
        Ok(())
    }

    #[test]
    fn test_import_merges_and_overwrites() {
        let repo = setup();
        repo.import_records(&[record("M1", 10.0), record("M1", 5.0), record("M2", 1.0)])
            .unwrap();
        assert_eq!(repo.find_by_material("M1").unwrap().unwrap().available, 15.0);

        repo.import_records(&[record("M1", 3.0)]).unwrap();
        let level = repo.find_by_material("M1").unwrap().unwrap();
        assert_eq!(level.available, 3.0);
        assert_eq!(level.revision, 1);
        assert_eq!(repo.snapshot_records().unwrap().len(), 2);
    }

    #[test]
    fn test_apply_deltas_all_or_nothing() {
        let repo = setup();
        repo.import_records(&[record("M1", 10.0), record("M2", 1.0)]).unwrap();

        let err = apply_in_tx(&repo, &[delta("M1", -5.0), delta("M2", -2.0)]).unwrap_err();
        match err {
            RepositoryError::StockConflict { material_id, available, .. } => {
                assert_eq!(material_id, "M2");
                assert_eq!(available, 1.0);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        // M1 未被扣减
        assert_eq!(repo.find_by_material("M1").unwrap().unwrap().available, 10.0);

        apply_in_tx(&repo, &[delta("M1", -5.0), delta("P1", 2.0)]).unwrap();
        assert_eq!(repo.find_by_material("M1").unwrap().unwrap().available, 5.0);
        assert_eq!(repo.find_by_material("P1").unwrap().unwrap().available, 2.0);
    }

    #[test]
    fn test_consume_unknown_material_conflicts() {
        let repo = setup();
        let err = apply_in_tx(&repo, &[delta("M404", -1.0)]).unwrap_err();
        assert!(matches!(err, RepositoryError::StockConflict { available, .. } if available == 0.0));
    }

    #[test]
    fn test_receive_rejects_negative() {
        let repo = setup();
        assert!(matches!(
            repo.receive("M1", -1.0),
            Err(RepositoryError::FieldValueError { .. })
        ));
        repo.receive("M1", 4.0).unwrap();
        repo.receive("M1", 4.0).unwrap();
        assert_eq!(repo.find_by_material("M1").unwrap().unwrap().available, 8.0);
    }
}
