// ==========================================
// 生产可行性核心 - 计划配置读取 Trait
// ==========================================
// 职责: 定义 API 层所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::error::ConfigError;
use crate::domain::types::EmptyBomPolicy;
use async_trait::async_trait;

// ==========================================
// PlanningConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait PlanningConfigReader: Send + Sync {
    /// 获取空 BOM 判定策略
    ///
    /// # 默认值
    /// - INFEASIBLE
    async fn get_empty_bom_policy(&self) -> Result<EmptyBomPolicy, ConfigError>;

    /// 获取分配乐观锁冲突后的最大重试次数
    ///
    /// # 默认值
    /// - 3
    async fn get_allocation_max_retries(&self) -> Result<u32, ConfigError>;

    /// 获取默认操作人（未显式指定 actor 时写入操作日志）
    ///
    /// # 默认值
    /// - system
    async fn get_default_actor(&self) -> Result<String, ConfigError>;
}
