// ==========================================
// 生产可行性核心 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: BOM 驱动的生产可行性判定与库存分配
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则（纯计算）
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建库）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AllocationDecisionKind, EmptyBomPolicy, ProductionOrderStatus};

// 领域实体
pub use domain::{
    ActionLog, ActionType, AllocationDecision, AllocationRequest, AllocationState, BomComponent,
    BomRecord, FeasibilityVerdict, InventoryDelta, InventoryRecord, ProductionFeasibility,
    ProductionOrder,
};

// 引擎
pub use engine::{AllocationPlanner, BomIndex, EngineError, FeasibilityEvaluator, InventorySnapshot};

// API
pub use api::{AllocationApi, ApiError, ImportApi, ProductionApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "生产可行性核心";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
