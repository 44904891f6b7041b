// ==========================================
// 生产可行性核心 - 引擎层
// ==========================================
// 职责: BOM 可行性判定与分配计划的纯计算
// 红线: Engine 不拼 SQL, 不做 I/O, 拒绝必须输出 reason
// ==========================================

pub mod allocation;
pub mod bom_index;
pub mod error;
pub mod feasibility;
pub mod inventory_snapshot;

// 重导出核心引擎
pub use allocation::AllocationPlanner;
pub use bom_index::BomIndex;
pub use error::{EngineError, EngineResult};
pub use feasibility::FeasibilityEvaluator;
pub use inventory_snapshot::InventorySnapshot;
