// ==========================================
// 生产可行性核心 - 应用层
// ==========================================
// 职责: 装配共享状态，供 CLI 入口使用
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
