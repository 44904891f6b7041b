// ==========================================
// 生产可行性核心 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 物料不存在不是错误（按可用量 0 处理）
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// 生产/订购数量非正整数
    #[error("无效数量: {value}（必须为正整数）")]
    InvalidQuantity { value: String },

    /// 分配增量为负
    #[error("无效分配增量: {value}（分配不得减少）")]
    InvalidIncrement { value: i64 },

    /// 前置状态被破坏（外部数据损坏）
    #[error("无效分配状态: line_id={line_id}, ordered_qty={ordered_qty}, allocated_qty={allocated_qty}")]
    InvalidState {
        line_id: String,
        ordered_qty: i64,
        allocated_qty: i64,
    },

    /// BOM 行数据非法
    #[error("无效 BOM 行: product_id={product_id}, material_id={material_id}: {message}")]
    InvalidBomComponent {
        product_id: String,
        material_id: String,
        message: String,
    },

    /// 库存数据非法
    #[error("无效库存: material_id={material_id}, available={available}")]
    InvalidInventoryLevel { material_id: String, available: f64 },
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
