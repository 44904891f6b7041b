// ==========================================
// 生产可行性核心 - 记录映射器
// ==========================================
// 职责: 原始行 → 边界记录（BomRecord / InventoryRecord / Product）
// 红线: 非有限或负数量在边界处拒绝
// ==========================================

use crate::domain::bom::BomRecord;
use crate::domain::inventory::InventoryRecord;
use crate::domain::product::Product;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRow;

// 标准字段及其可接受的列名别名
const PRODUCT_ID: &[&str] = &["product_id", "productId", "产品ID", "产品编号"];
const MATERIAL_ID: &[&str] = &["material_id", "materialId", "物料ID", "物料编号"];
const QUANTITY_PER_UNIT: &[&str] = &["quantity", "quantity_per_unit", "quantityPerUnit", "单耗"];
const UNIT: &[&str] = &["unit", "单位"];
const COMPONENT_TYPE: &[&str] = &["type", "component_type", "componentType", "类型"];
const AVAILABLE: &[&str] = &["available", "quantity", "可用量", "库存"];
const NAME: &[&str] = &["name", "名称", "产品名称"];
const SKU: &[&str] = &["sku", "SKU"];

pub struct RecordMapper;

impl RecordMapper {
    /// 映射 BOM 行
    ///
    /// 必需列: product_id, material_id, quantity；unit/type 缺省为空串
    pub fn map_bom_rows(&self, rows: &[RawRow]) -> ImportResult<Vec<BomRecord>> {
        self.require_columns(rows, &[PRODUCT_ID, MATERIAL_ID, QUANTITY_PER_UNIT])?;

        rows.iter()
            .map(|row| {
                Ok(BomRecord {
                    product_id: self.required_string(row, PRODUCT_ID)?,
                    material_id: self.required_string(row, MATERIAL_ID)?,
                    quantity_per_unit: self.non_negative_f64(row, QUANTITY_PER_UNIT)?,
                    unit: self.get_string(row, UNIT).unwrap_or_default(),
                    component_type: self.get_string(row, COMPONENT_TYPE).unwrap_or_default(),
                })
            })
            .collect()
    }

    /// 映射库存行（同一物料多行由快照累加，此处不合并）
    pub fn map_inventory_rows(&self, rows: &[RawRow]) -> ImportResult<Vec<InventoryRecord>> {
        self.require_columns(rows, &[MATERIAL_ID, AVAILABLE])?;

        rows.iter()
            .map(|row| {
                Ok(InventoryRecord {
                    material_id: self.required_string(row, MATERIAL_ID)?,
                    available: self.non_negative_f64(row, AVAILABLE)?,
                })
            })
            .collect()
    }

    /// 映射产品目录行（name/sku 缺省为空串）
    pub fn map_product_rows(&self, rows: &[RawRow]) -> ImportResult<Vec<Product>> {
        self.require_columns(rows, &[PRODUCT_ID])?;

        rows.iter()
            .map(|row| {
                Ok(Product {
                    product_id: self.required_string(row, PRODUCT_ID)?,
                    name: self.get_string(row, NAME).unwrap_or_default(),
                    sku: self.get_string(row, SKU).unwrap_or_default(),
                })
            })
            .collect()
    }

    /// 首行缺列时直接报错（避免逐行报同一个错）
    fn require_columns(&self, rows: &[RawRow], fields: &[&[&str]]) -> ImportResult<()> {
        let Some(first) = rows.first() else {
            return Ok(());
        };
        for aliases in fields {
            if !aliases.iter().any(|alias| first.cells.contains_key(*alias)) {
                return Err(ImportError::MissingColumn {
                    column: aliases[0].to_string(),
                });
            }
        }
        Ok(())
    }

    /// 提取字符串字段（按别名顺序取第一个非空值）
    fn get_string(&self, row: &RawRow, aliases: &[&str]) -> Option<String> {
        aliases
            .iter()
            .filter_map(|alias| row.get(alias))
            .map(str::trim)
            .find(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn required_string(&self, row: &RawRow, aliases: &[&str]) -> ImportResult<String> {
        self.get_string(row, aliases)
            .ok_or_else(|| ImportError::RequiredFieldMissing {
                row: row.row_number,
                field: aliases[0].to_string(),
            })
    }

    fn non_negative_f64(&self, row: &RawRow, aliases: &[&str]) -> ImportResult<f64> {
        let raw = self.required_string(row, aliases)?;
        let value = raw
            .parse::<f64>()
            .map_err(|_| ImportError::TypeConversionError {
                row: row.row_number,
                field: aliases[0].to_string(),
                message: format!("无法解析为数值: {}", raw),
            })?;

        if !value.is_finite() || value < 0.0 {
            return Err(ImportError::ValueRangeError {
                row: row.row_number,
                field: aliases[0].to_string(),
                value,
            });
        }
        Ok(value)
    }
}
