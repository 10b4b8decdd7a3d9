//! Domain events and their broadcast audiences.
//!
//! 领域操作不直接接触传输层：每个操作返回 (新状态, 待发布事件列表)，
//! 由外层适配器负责真正的推送。这样核心逻辑不需要 socket 即可测试。

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::models::{
    Bill, DiningTable, Order, Settlement, StaffRole, TableStatus,
};
use crate::util::now_millis;

/// Who receives an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Audience {
    /// Every connected staff member
    All,
    /// Every connected member of one role channel
    Role(StaffRole),
    /// One staff member's personal channel, with a role-wide fallback
    /// broadcast issued in parallel so nobody's absence drops the work
    Staff {
        staff_id: String,
        fallback: StaffRole,
    },
}

/// A state-change notification produced by a domain operation.
///
/// Events are invalidation hints: clients must re-fetch authoritative
/// state, never treat the payload as the state itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    pub name: String,
    pub audience: Audience,
    pub payload: Value,
}

impl DomainEvent {
    pub fn new(name: impl Into<String>, audience: Audience, payload: Value) -> Self {
        Self {
            name: name.into(),
            audience,
            payload,
        }
    }

    /// `order.created` → kitchen
    pub fn order_created(order: &Order) -> Self {
        Self::new(
            "order.created",
            Audience::Role(StaffRole::Kitchen),
            json!({ "order": order, "ts": now_millis() }),
        )
    }

    /// `order.updated` → kitchen (lines appended)
    pub fn order_updated(order: &Order) -> Self {
        Self::new(
            "order.updated",
            Audience::Role(StaffRole::Kitchen),
            json!({ "order": order, "ts": now_millis() }),
        )
    }

    /// `order.ready` → the waiter of record, falling back to all waiters
    pub fn order_ready(order: &Order) -> Self {
        Self::new(
            "order.ready",
            Audience::Staff {
                staff_id: order.created_by.clone(),
                fallback: StaffRole::Waiter,
            },
            json!({ "order": order, "ts": now_millis() }),
        )
    }

    /// `order.delivered` → cashier (the order is now billable)
    pub fn order_delivered(order: &Order) -> Self {
        Self::new(
            "order.delivered",
            Audience::Role(StaffRole::Cashier),
            json!({ "order": order, "ts": now_millis() }),
        )
    }

    /// `order.cancelled` → everyone
    pub fn order_cancelled(order: &Order) -> Self {
        Self::new(
            "order.cancelled",
            Audience::All,
            json!({ "order": order, "ts": now_millis() }),
        )
    }

    /// `table.statusChanged` → everyone, with previous and new status
    pub fn table_status_changed(table: &DiningTable, previous: TableStatus) -> Self {
        Self::new(
            "table.statusChanged",
            Audience::All,
            json!({
                "table": table,
                "previous_status": previous,
                "new_status": table.status,
                "ts": now_millis(),
            }),
        )
    }

    /// `payment.processed` → everyone (the table is free again)
    pub fn payment_processed(settlement: &Settlement, bill: &Bill) -> Self {
        Self::new(
            "payment.processed",
            Audience::All,
            json!({ "settlement": settlement, "bill": bill, "ts": now_millis() }),
        )
    }

    /// `sale.recorded` → admin, for live revenue metrics
    pub fn sale_recorded(settlement: &Settlement) -> Self {
        Self::new(
            "sale.recorded",
            Audience::Role(StaffRole::Admin),
            json!({
                "table_number": settlement.table_number,
                "amount": settlement.total,
                "method": settlement.method,
                "ts": now_millis(),
            }),
        )
    }
}
