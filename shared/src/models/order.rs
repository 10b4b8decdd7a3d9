//! Order Model
//!
//! 订单生命周期状态机：
//!
//! ```text
//! New ──► InKitchen ──► Ready ──► Delivered ──► Paid (终态)
//!  │          │           │
//!  └──────────┴───────────┴──► Cancelled (终态)
//! ```
//!
//! Paid 只能由结算引擎产生；Delivered 之后追加菜品会回到 InKitchen
//! (新菜需要重新进厨房)，但公开的状态转换接口不允许这条边。

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 订单状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    New,
    InKitchen,
    Ready,
    Delivered,
    Paid,
    Cancelled,
}

impl OrderStatus {
    /// Terminal statuses never leave their state
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Cancelled)
    }

    /// Open = still counts against the table (not paid, not cancelled)
    pub fn is_open(&self) -> bool {
        !self.is_terminal()
    }

    /// Explicit transition table for the public `transition` operation.
    ///
    /// Paid is intentionally absent: it is only ever produced by the
    /// settlement engine. Delivered→InKitchen happens only as a side
    /// effect of appending lines, never through this table.
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, target),
            (New, InKitchen)
                | (InKitchen, Ready)
                | (Ready, Delivered)
                | (New, Cancelled)
                | (InKitchen, Cancelled)
                | (Ready, Cancelled)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::New => "new",
            OrderStatus::InKitchen => "in_kitchen",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Paid => "paid",
            OrderStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// 支付方式 (仅记录，不对接支付网关)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Mobile,
}

/// Payment details, populated only when an order reaches Paid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub method: PaymentMethod,
    pub amount_received: Decimal,
    pub paid_at: DateTime<Utc>,
}

/// Cancellation details, populated only when an order reaches Cancelled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancellationInfo {
    pub reason: String,
    pub cancelled_at: DateTime<Utc>,
}

/// Order entity
///
/// `total` is a cached derivation and always equals the sum of the
/// order's line subtotals after every mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub table_id: String,
    /// The waiter of record (staff member who created the order)
    pub created_by: String,
    pub status: OrderStatus,
    pub total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation: Option<CancellationInfo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order line entity
///
/// Immutable once created: adding food always appends new lines. The
/// unit price and product name are snapshotted at creation time so a
/// later menu change never rewrites history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

/// Line input when creating an order or appending to one
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineInput {
    pub product_id: String,
    pub quantity: u32,
}

/// One product rollup row inside a bill
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillLine {
    pub product_name: String,
    pub quantity: u32,
    pub subtotal: Decimal,
}

/// Read-time projection over a table's open orders.
///
/// Never persisted and never cached across requests: the underlying
/// orders can change between views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    pub table_id: String,
    pub table_number: u32,
    pub total: Decimal,
    pub item_count: u32,
    pub order_count: u32,
    pub lines: Vec<BillLine>,
    pub generated_at: DateTime<Utc>,
}

/// Result of settling a table's bill
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    pub table_id: String,
    pub table_number: u32,
    pub total: Decimal,
    pub method: PaymentMethod,
    pub amount_received: Decimal,
    pub change: Decimal,
    pub orders_settled: u32,
    pub settled_by: String,
    pub settled_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_transitions() {
        use OrderStatus::*;
        assert!(New.can_transition_to(InKitchen));
        assert!(InKitchen.can_transition_to(Ready));
        assert!(Ready.can_transition_to(Delivered));
        assert!(New.can_transition_to(Cancelled));
        assert!(InKitchen.can_transition_to(Cancelled));
        assert!(Ready.can_transition_to(Cancelled));
    }

    #[test]
    fn test_illegal_transitions() {
        use OrderStatus::*;
        // Paid is settlement-only
        assert!(!Delivered.can_transition_to(Paid));
        assert!(!Ready.can_transition_to(Paid));
        // No going backwards
        assert!(!Ready.can_transition_to(New));
        assert!(!Delivered.can_transition_to(InKitchen));
        // Terminal states stay terminal
        assert!(!Paid.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(New));
        // Delivered orders cannot be cancelled
        assert!(!Delivered.can_transition_to(Cancelled));
    }

    #[test]
    fn test_open_statuses() {
        use OrderStatus::*;
        assert!(New.is_open());
        assert!(InKitchen.is_open());
        assert!(Ready.is_open());
        assert!(Delivered.is_open());
        assert!(!Paid.is_open());
        assert!(!Cancelled.is_open());
    }
}
