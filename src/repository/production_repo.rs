// ==========================================
// 生产可行性核心 - 生产单仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 下达: 写生产单 + 扣减物料（单事务）
// 完工: 状态迁移 + 成品入库（单事务）
// ==========================================

use crate::domain::inventory::InventoryDelta;
use crate::domain::production::ProductionOrder;
use crate::domain::types::ProductionOrderStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::inventory_repo::{apply_deltas_with, receive_with};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

pub struct ProductionOrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProductionOrderRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 下达生产单并扣减物料
    ///
    /// # 参数
    /// - `consumption`: 物料变化（负数为扣减）
    /// - `feasibility_json` / `config_snapshot_json`: 下达时的判定与配置快照
    ///
    /// # 错误
    /// - `StockConflict`: 判定后库存被其他会话占用，整体回滚
    pub fn release(
        &self,
        order: &ProductionOrder,
        consumption: &[InventoryDelta],
        feasibility_json: Option<&str>,
        config_snapshot_json: Option<&str>,
    ) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO production_order (
                production_order_id, product_id, quantity, status, created_by,
                created_at, completed_at, feasibility_json, config_snapshot_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                order.production_order_id,
                order.product_id,
                order.quantity,
                order.status.to_db_str(),
                order.created_by,
                order.created_at.format(TS_FORMAT).to_string(),
                order.completed_at.map(|ts| ts.format(TS_FORMAT).to_string()),
                feasibility_json,
                config_snapshot_json,
            ],
        )?;

        apply_deltas_with(&tx, consumption)?;

        tx.commit()?;
        Ok(())
    }

    /// 完工: RELEASED -> COMPLETED，成品按生产数量入库
    pub fn complete(
        &self,
        production_order_id: &str,
        completed_at: NaiveDateTime,
    ) -> RepositoryResult<ProductionOrder> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let mut order = find_with(&tx, production_order_id)?.ok_or_else(|| {
            RepositoryError::NotFound {
                entity: "ProductionOrder".to_string(),
                id: production_order_id.to_string(),
            }
        })?;

        let rows = tx.execute(
            r#"
            UPDATE production_order
            SET status = ?1, completed_at = ?2
            WHERE production_order_id = ?3 AND status = ?4
            "#,
            params![
                ProductionOrderStatus::Completed.to_db_str(),
                completed_at.format(TS_FORMAT).to_string(),
                production_order_id,
                ProductionOrderStatus::Released.to_db_str(),
            ],
        )?;

        if rows == 0 {
            return Err(RepositoryError::InvalidStateTransition {
                from: order.status.to_string(),
                to: ProductionOrderStatus::Completed.to_string(),
            });
        }

        receive_with(&tx, &order.product_id, order.quantity as f64)?;
        tx.commit()?;

        order.status = ProductionOrderStatus::Completed;
        order.completed_at = Some(completed_at);
        Ok(order)
    }

    pub fn find_by_id(&self, production_order_id: &str) -> RepositoryResult<Option<ProductionOrder>> {
        let conn = self.get_conn()?;
        find_with(&conn, production_order_id)
    }

    /// 查询产品的生产单（按创建时间倒序）
    pub fn list_by_product(&self, product_id: &str) -> RepositoryResult<Vec<ProductionOrder>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT production_order_id, product_id, quantity, status, created_by, created_at, completed_at
            FROM production_order
            WHERE product_id = ?1
            ORDER BY created_at DESC
            "#,
        )?;
        let orders = stmt
            .query_map(params![product_id], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(orders)
    }
}

fn find_with(conn: &Connection, production_order_id: &str) -> RepositoryResult<Option<ProductionOrder>> {
    let order = conn
        .query_row(
            r#"
            SELECT production_order_id, product_id, quantity, status, created_by, created_at, completed_at
            FROM production_order
            WHERE production_order_id = ?1
            "#,
            params![production_order_id],
            map_row,
        )
        .optional()?;
    Ok(order)
}

fn map_row(row: &Row) -> SqliteResult<ProductionOrder> {
    let status: String = row.get(3)?;
    let created_at: String = row.get(5)?;
    let completed_at: Option<String> = row.get(6)?;

    Ok(ProductionOrder {
        production_order_id: row.get(0)?,
        product_id: row.get(1)?,
        quantity: row.get(2)?,
        status: ProductionOrderStatus::from_db_str(&status),
        created_by: row.get(4)?,
        created_at: parse_ts(5, &created_at)?,
        completed_at: completed_at.map(|s| parse_ts(6, &s)).transpose()?,
    })
}

fn parse_ts(idx: usize, s: &str) -> SqliteResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TS_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
