// ==========================================
// 生产可行性核心 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// 约束: 库存扣减与订单行分配均为条件更新（并发安全）
// ==========================================

pub mod action_log_repo;
pub mod bom_repo;
pub mod error;
pub mod inventory_repo;
pub mod order_line_repo;
pub mod product_repo;
pub mod production_repo;

// 重导出核心仓储
pub use action_log_repo::ActionLogRepository;
pub use bom_repo::BomRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use inventory_repo::InventoryRepository;
pub use order_line_repo::OrderLineRepository;
pub use product_repo::ProductRepository;
pub use production_repo::ProductionOrderRepository;
