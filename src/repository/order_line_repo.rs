// ==========================================
// 生产可行性核心 - 订单行分配数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 并发控制: revision 乐观锁 + 库存条件扣减，同一事务内要么全部生效要么全部回滚
// ==========================================

use crate::domain::allocation::AllocationState;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::inventory_repo::consume_with;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

pub struct OrderLineRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OrderLineRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新建订单行（allocated_qty 固定为 0）
    pub fn create_line(
        &self,
        line_id: &str,
        order_id: &str,
        product_id: &str,
        ordered_qty: i64,
    ) -> RepositoryResult<AllocationState> {
        if ordered_qty < 0 {
            return Err(RepositoryError::FieldValueError {
                field: "ordered_qty".to_string(),
                message: format!("订购数量不能为负: {}", ordered_qty),
            });
        }

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO order_line (line_id, order_id, product_id, ordered_qty, allocated_qty, revision)
            VALUES (?1, ?2, ?3, ?4, 0, 0)
            "#,
            params![line_id, order_id, product_id, ordered_qty],
        )?;

        Ok(AllocationState::new_line(line_id, order_id, product_id, ordered_qty))
    }

    /// 按订单行ID查询
    pub fn find_by_line_id(&self, line_id: &str) -> RepositoryResult<Option<AllocationState>> {
        let conn = self.get_conn()?;
        find_with(&conn, line_id)
    }

    /// 查询订单下所有行
    pub fn list_by_order(&self, order_id: &str) -> RepositoryResult<Vec<AllocationState>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT line_id, order_id, product_id, ordered_qty, allocated_qty, revision
            FROM order_line
            WHERE order_id = ?1
            ORDER BY line_id
            "#,
        )?;

        let lines = stmt
            .query_map(params![order_id], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(lines)
    }

    /// 原子落库分配决策
    ///
    /// # 步骤（单事务）
    /// 1. allocated_qty += granted，条件: revision 未变 且 不超过 ordered_qty
    /// 2. 成品库存 -= granted，条件: available >= granted
    ///
    /// # 错误
    /// - `OptimisticLockFailure`: 订单行已被其他会话更新
    /// - `StockConflict`: 库存已被其他会话占用
    /// - `NotFound`: 订单行不存在
    pub fn apply_allocation(
        &self,
        expected: &AllocationState,
        granted_qty: i64,
    ) -> RepositoryResult<AllocationState> {
        if granted_qty < 0 {
            return Err(RepositoryError::FieldValueError {
                field: "granted_qty".to_string(),
                message: format!("分配量不能为负: {}", granted_qty),
            });
        }

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let rows = tx.execute(
            r#"
            UPDATE order_line
            SET allocated_qty = allocated_qty + ?1,
                revision = revision + 1,
                updated_at = datetime('now')
            WHERE line_id = ?2
              AND revision = ?3
              AND allocated_qty + ?1 <= ordered_qty
            "#,
            params![granted_qty, expected.line_id, expected.revision],
        )?;

        if rows == 0 {
            // 判断是记录不存在还是revision冲突
            return Err(match find_with(&tx, &expected.line_id)? {
                Some(actual) => RepositoryError::OptimisticLockFailure {
                    entity_id: expected.line_id.clone(),
                    expected: expected.revision,
                    actual: actual.revision,
                },
                None => RepositoryError::NotFound {
                    entity: "OrderLine".to_string(),
                    id: expected.line_id.clone(),
                },
            });
        }

        consume_with(&tx, &expected.product_id, granted_qty as f64)?;

        let updated = find_with(&tx, &expected.line_id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "OrderLine".to_string(),
            id: expected.line_id.clone(),
        })?;

        tx.commit()?;
        Ok(updated)
    }
}

fn find_with(conn: &Connection, line_id: &str) -> RepositoryResult<Option<AllocationState>> {
    let line = conn
        .query_row(
            r#"
            SELECT line_id, order_id, product_id, ordered_qty, allocated_qty, revision
            FROM order_line
            WHERE line_id = ?1
            "#,
            params![line_id],
            map_row,
        )
        .optional()?;
    Ok(line)
}

fn map_row(row: &Row) -> SqliteResult<AllocationState> {
    Ok(AllocationState {
        line_id: row.get(0)?,
        order_id: row.get(1)?,
        product_id: row.get(2)?,
        ordered_qty: row.get(3)?,
        allocated_qty: row.get(4)?,
        revision: row.get(5)?,
    })
}
