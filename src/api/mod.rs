// ==========================================
// 生产可行性核心 - API 层
// ==========================================
// 职责: 组合仓储、引擎与配置，提供业务接口（供 CLI 调用）
// ==========================================

pub mod allocation_api;
pub mod error;
pub mod import_api;
pub mod production_api;

// 重导出核心类型
pub use allocation_api::{AllocationApi, AllocationResponse};
pub use error::{ApiError, ApiResult};
pub use import_api::{ImportApi, ImportSummary};
pub use production_api::{FeasibilityOutcome, ProductionApi};
