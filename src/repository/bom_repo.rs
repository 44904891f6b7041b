// ==========================================
// 生产可行性核心 - BOM 数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 每个产品的 BOM 行以 line_no 保持输入顺序
// ==========================================

use crate::domain::bom::{BomComponent, BomRecord};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};

pub struct BomRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BomRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 批量导入 BOM 记录
    ///
    /// 按产品分组后逐产品替换，组内保持记录顺序；整体单事务
    pub fn import_records(&self, records: &[BomRecord]) -> RepositoryResult<usize> {
        let mut grouped: Vec<(&str, Vec<BomComponent>)> = Vec::new();
        for record in records {
            let component = BomComponent::from(record.clone());
            match grouped.iter_mut().find(|(p, _)| *p == record.product_id) {
                Some((_, list)) => list.push(component),
                None => grouped.push((record.product_id.as_str(), vec![component])),
            }
        }

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        for (product_id, components) in &grouped {
            replace_with(&tx, product_id, components)?;
        }
        tx.commit()?;

        Ok(records.len())
    }

    /// 查询单个产品的 BOM（按 line_no）
    pub fn find_by_product(&self, product_id: &str) -> RepositoryResult<Vec<BomComponent>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT material_id, quantity_per_unit, unit, component_type
            FROM bom_component
            WHERE product_id = ?1
            ORDER BY line_no
            "#,
        )?;

        let components = stmt
            .query_map(params![product_id], |row| {
                Ok(BomComponent {
                    material_id: row.get(0)?,
                    quantity_per_unit: row.get(1)?,
                    unit: row.get(2)?,
                    component_type: row.get(3)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(components)
    }

    /// 查询全部 BOM 记录（用于构建 BomIndex）
    pub fn list_all_records(&self) -> RepositoryResult<Vec<BomRecord>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT product_id, material_id, quantity_per_unit, unit, component_type
            FROM bom_component
            ORDER BY product_id, line_no
            "#,
        )?;

        let records = stmt
            .query_map([], |row| {
                Ok(BomRecord {
                    product_id: row.get(0)?,
                    material_id: row.get(1)?,
                    quantity_per_unit: row.get(2)?,
                    unit: row.get(3)?,
                    component_type: row.get(4)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(records)
    }
}

fn replace_with(
    conn: &Connection,
    product_id: &str,
    components: &[BomComponent],
) -> rusqlite::Result<()> {
    conn.execute(
        "DELETE FROM bom_component WHERE product_id = ?1",
        params![product_id],
    )?;
    for (line_no, component) in components.iter().enumerate() {
        conn.execute(
            r#"
            INSERT INTO bom_component (
                product_id, line_no, material_id, quantity_per_unit, unit, component_type
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                product_id,
                line_no as i64,
                component.material_id,
                component.quantity_per_unit,
                component.unit,
                component.component_type,
            ],
        )?;
    }
    Ok(())
}
