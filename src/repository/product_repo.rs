// ==========================================
// 生产可行性核心 - 产品目录仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::product::Product;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

pub struct ProductRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProductRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 批量写入产品（存在则更新名称与 SKU）
    pub fn upsert_batch(&self, products: &[Product]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        for product in products {
            tx.execute(
                r#"
                INSERT INTO product (product_id, name, sku)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(product_id) DO UPDATE SET
                    name = excluded.name,
                    sku = excluded.sku
                "#,
                params![product.product_id, product.name, product.sku],
            )?;
        }

        tx.commit()?;
        Ok(products.len())
    }

    pub fn find_by_id(&self, product_id: &str) -> RepositoryResult<Option<Product>> {
        let conn = self.get_conn()?;
        let product = conn
            .query_row(
                "SELECT product_id, name, sku FROM product WHERE product_id = ?1",
                params![product_id],
                map_row,
            )
            .optional()?;
        Ok(product)
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<Product>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT product_id, name, sku FROM product ORDER BY product_id")?;
        let products = stmt
            .query_map([], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(products)
    }
}

fn map_row(row: &Row) -> SqliteResult<Product> {
    Ok(Product {
        product_id: row.get(0)?,
        name: row.get(1)?,
        sku: row.get(2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, name: &str) -> Product {
        Product {
            product_id: id.to_string(),
            name: name.to_string(),
            sku: format!("SKU-{}", id),
        }
    }

    #[test]
    fn test_upsert_and_list() {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        let repo = ProductRepository::new(Arc::new(Mutex::new(conn)));

        repo.upsert_batch(&[product("P2", "Chair"), product("P1", "Table")])
            .unwrap();
        repo.upsert_batch(&[product("P1", "Desk")]).unwrap();

        let all = repo.list_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].product_id, "P1");
        assert_eq!(repo.find_by_id("P1").unwrap().unwrap().name, "Desk");
        assert!(repo.find_by_id("P9").unwrap().is_none());
    }
}
