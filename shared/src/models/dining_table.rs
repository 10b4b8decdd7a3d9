//! Dining Table Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 餐桌服务状态
///
/// 状态由订单生命周期自动驱动 (Free→Occupied 开单, →Free 结账/全部取消)，
/// 也可以由员工手动覆盖 (例如客人要求结账时标记 BillRequested)。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    Free,
    Occupied,
    BillRequested,
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableStatus::Free => write!(f, "free"),
            TableStatus::Occupied => write!(f, "occupied"),
            TableStatus::BillRequested => write!(f, "bill_requested"),
        }
    }
}

impl FromStr for TableStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(TableStatus::Free),
            "occupied" => Ok(TableStatus::Occupied),
            "bill_requested" => Ok(TableStatus::BillRequested),
            other => Err(format!("Unknown table status: {}", other)),
        }
    }
}

/// Dining table entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTable {
    pub id: String,
    /// Human-facing table number, unique among active tables
    pub number: u32,
    pub capacity: u32,
    pub status: TableStatus,
    pub is_active: bool,
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableCreate {
    pub number: u32,
    pub capacity: Option<u32>,
}
