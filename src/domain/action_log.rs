// ==========================================
// 生产可行性核心 - 操作日志领域模型
// ==========================================
// 红线: 所有写入必须记录
// 用途: 审计追踪（分配、生产下达、完工、导入）
// ==========================================

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

// ==========================================
// ActionLog - 操作日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub action_id: String,
    pub action_type: String,       // 操作类型 (存储为字符串)
    pub action_ts: NaiveDateTime,
    pub actor: String,
    pub entity_id: Option<String>, // 关联实体 (订单行/生产单/产品)
    pub payload_json: Option<JsonValue>,
    pub detail: Option<String>,
}

impl ActionLog {
    /// 以当前时间创建日志，action_id 使用 UUID v4
    pub fn now(action_type: ActionType, actor: &str, entity_id: Option<&str>) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            action_type: action_type.to_string(),
            action_ts: Utc::now().naive_utc(),
            actor: actor.to_string(),
            entity_id: entity_id.map(str::to_string),
            payload_json: None,
            detail: None,
        }
    }

    pub fn with_payload(mut self, payload: JsonValue) -> Self {
        self.payload_json = Some(payload);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    ImportBom,         // 导入 BOM
    ImportInventory,   // 导入库存
    ImportProducts,    // 导入产品目录
    Allocate,          // 订单行分配
    AllocateRejected,  // 分配被拒绝
    ReleaseProduction, // 生产下达
    CompleteProduction, // 生产完工
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionType::ImportBom => "ImportBom",
            ActionType::ImportInventory => "ImportInventory",
            ActionType::ImportProducts => "ImportProducts",
            ActionType::Allocate => "Allocate",
            ActionType::AllocateRejected => "AllocateRejected",
            ActionType::ReleaseProduction => "ReleaseProduction",
            ActionType::CompleteProduction => "CompleteProduction",
        };
        f.write_str(s)
    }
}
