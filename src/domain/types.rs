// ==========================================
// 生产可行性核心 - 领域类型定义
// ==========================================
// 枚举统一采用 SCREAMING_SNAKE_CASE 存储（与数据库一致）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 空 BOM 策略 (Empty BOM Policy)
// ==========================================
// 产品未定义 BOM 时的可行性判定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmptyBomPolicy {
    #[default]
    Infeasible, // 无配方即不可生产
    Feasible,   // 无配方视为无需物料
}

impl fmt::Display for EmptyBomPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

impl EmptyBomPolicy {
    /// 从字符串解析策略，无法识别时返回 None
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "INFEASIBLE" => Some(EmptyBomPolicy::Infeasible),
            "FEASIBLE" => Some(EmptyBomPolicy::Feasible),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            EmptyBomPolicy::Infeasible => "INFEASIBLE",
            EmptyBomPolicy::Feasible => "FEASIBLE",
        }
    }
}

// ==========================================
// 分配决策类型 (Allocation Decision Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocationDecisionKind {
    Full,     // 全额满足
    Partial,  // 部分满足
    Rejected, // 拒绝
}

impl fmt::Display for AllocationDecisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationDecisionKind::Full => write!(f, "FULL"),
            AllocationDecisionKind::Partial => write!(f, "PARTIAL"),
            AllocationDecisionKind::Rejected => write!(f, "REJECTED"),
        }
    }
}

// ==========================================
// 生产单状态 (Production Order Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductionOrderStatus {
    Released,  // 已下达（物料已扣减）
    Completed, // 已完工（成品已入库）
}

impl fmt::Display for ProductionOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

impl ProductionOrderStatus {
    /// 从字符串解析状态
    pub fn from_db_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "COMPLETED" => ProductionOrderStatus::Completed,
            _ => ProductionOrderStatus::Released, // 默认值
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            ProductionOrderStatus::Released => "RELEASED",
            ProductionOrderStatus::Completed => "COMPLETED",
        }
    }
}
