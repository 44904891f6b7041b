// ==========================================
// 生产可行性核心 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (scope_id='global')
// ==========================================

use crate::config::error::ConfigError;
use crate::config::planning_config_trait::PlanningConfigReader;
use crate::db::open_sqlite_connection;
use crate::domain::types::EmptyBomPolicy;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, ConfigError> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, ConfigError> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| ConfigError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> Result<MutexGuard<'_, Connection>, ConfigError> {
        self.conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let conn = self.get_conn()?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, ConfigError> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global scope 的配置值
    ///
    /// 已知配置键会先做格式校验，格式错误返回 InvalidValue
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), ConfigError> {
        validate_known_key(key, value)?;

        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;

        tracing::info!(config_key = key, value, "配置已更新");
        Ok(())
    }

    /// 获取所有 global 配置的快照（JSON格式）
    ///
    /// 用于在生产下达时记录当时的判定配置
    pub fn get_config_snapshot(&self) -> Result<String, ConfigError> {
        let conn = self.get_conn()?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    /// 解析操作人: 显式传入（非空白）优先，否则取 default_actor
    pub async fn resolve_actor(&self, actor: Option<&str>) -> Result<String, ConfigError> {
        match actor.map(str::trim).filter(|a| !a.is_empty()) {
            Some(a) => Ok(a.to_string()),
            None => self.get_default_actor().await,
        }
    }
}

fn validate_known_key(key: &str, value: &str) -> Result<(), ConfigError> {
    let valid = match key {
        config_keys::EMPTY_BOM_POLICY => EmptyBomPolicy::parse(value).is_some(),
        config_keys::ALLOCATION_MAX_RETRIES => value.trim().parse::<u32>().is_ok(),
        config_keys::DEFAULT_ACTOR => !value.trim().is_empty(),
        _ => true,
    };

    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

// ==========================================
// PlanningConfigReader Trait 实现
// ==========================================
#[async_trait]
impl PlanningConfigReader for ConfigManager {
    async fn get_empty_bom_policy(&self) -> Result<EmptyBomPolicy, ConfigError> {
        let value = self.get_config_or_default(config_keys::EMPTY_BOM_POLICY, "INFEASIBLE")?;
        Ok(EmptyBomPolicy::parse(&value).unwrap_or_else(|| {
            tracing::warn!(
                config_key = config_keys::EMPTY_BOM_POLICY,
                raw_value = %value,
                "空 BOM 策略配置格式错误，使用 INFEASIBLE"
            );
            EmptyBomPolicy::Infeasible
        }))
    }

    async fn get_allocation_max_retries(&self) -> Result<u32, ConfigError> {
        let value = self.get_config_or_default(config_keys::ALLOCATION_MAX_RETRIES, "3")?;
        Ok(value.trim().parse::<u32>().unwrap_or(3))
    }

    async fn get_default_actor(&self) -> Result<String, ConfigError> {
        let value = self.get_config_or_default(config_keys::DEFAULT_ACTOR, "system")?;
        let value = value.trim();
        Ok(if value.is_empty() { "system".to_string() } else { value.to_string() })
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 可行性判定
    pub const EMPTY_BOM_POLICY: &str = "empty_bom_policy";

    // 分配并发控制
    pub const ALLOCATION_MAX_RETRIES: &str = "allocation_max_retries";

    // 审计
    pub const DEFAULT_ACTOR: &str = "default_actor";
}
