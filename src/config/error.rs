// ==========================================
// 生产可行性核心 - 配置层错误类型
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置锁获取失败: {0}")]
    LockError(String),

    #[error("配置值格式错误 (key: {key}, value: {value})")]
    InvalidValue { key: String, value: String },

    #[error("配置数据库错误: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("配置快照格式错误: {0}")]
    Snapshot(#[from] serde_json::Error),
}
