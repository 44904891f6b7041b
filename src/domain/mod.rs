// ==========================================
// 生产可行性核心 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、边界记录
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod action_log;
pub mod allocation;
pub mod bom;
pub mod feasibility;
pub mod inventory;
pub mod product;
pub mod production;
pub mod types;

// 重导出核心类型
pub use action_log::{ActionLog, ActionType};
pub use allocation::{AllocationDecision, AllocationRequest, AllocationState};
pub use bom::{BomComponent, BomRecord};
pub use feasibility::{FeasibilityRequest, FeasibilityVerdict, ProductionFeasibility};
pub use inventory::{InventoryDelta, InventoryLevel, InventoryRecord};
pub use product::Product;
pub use production::ProductionOrder;
pub use types::{AllocationDecisionKind, EmptyBomPolicy, ProductionOrderStatus};
