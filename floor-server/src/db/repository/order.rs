//! Order Repository
//!
//! 订单与订单行的读写。状态守卫更新和批量结算更新是并发控制的
//! 关键路径 (§ 生命周期管理器 / 结算引擎)。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use shared::models::{Order, OrderLine, OrderStatus, PaymentInfo};

use super::{ORDER_LINES, ORDERS, decode, decode_all, encode};
use crate::db::{Filter, Store, StoreResult};

#[derive(Debug, Clone)]
pub struct OrderRepository {
    store: Arc<dyn Store>,
}

impl OrderRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn find_by_id(&self, id: &str) -> StoreResult<Option<Order>> {
        match self.store.get(ORDERS, id).await? {
            Some(doc) => Ok(Some(decode(doc)?)),
            None => Ok(None),
        }
    }

    /// All open (non-paid, non-cancelled) orders for a table
    pub async fn open_orders_for_table(&self, table_id: &str) -> StoreResult<Vec<Order>> {
        let filter = Filter::new()
            .eq("table_id", table_id)
            .not_in("status", terminal_status_values());
        decode_all(self.store.find(ORDERS, &filter).await?)
    }

    pub async fn create(&self, order: &Order) -> StoreResult<Order> {
        let doc = self.store.create(ORDERS, encode(order)?).await?;
        decode(doc)
    }

    pub async fn create_line(&self, line: &OrderLine) -> StoreResult<OrderLine> {
        let doc = self.store.create(ORDER_LINES, encode(line)?).await?;
        decode(doc)
    }

    pub async fn delete_line(&self, id: &str) -> StoreResult<bool> {
        self.store.delete(ORDER_LINES, id).await
    }

    /// Lines belonging to one order
    pub async fn lines_for_order(&self, order_id: &str) -> StoreResult<Vec<OrderLine>> {
        let filter = Filter::new().eq("order_id", order_id);
        decode_all(self.store.find(ORDER_LINES, &filter).await?)
    }

    /// Lines belonging to any of the given orders
    pub async fn lines_for_orders(&self, order_ids: &[String]) -> StoreResult<Vec<OrderLine>> {
        let ids = order_ids
            .iter()
            .map(|id| Value::String(id.clone()))
            .collect();
        let filter = Filter::new().is_in("order_id", ids);
        decode_all(self.store.find(ORDER_LINES, &filter).await?)
    }

    /// Optimistic status-guarded update.
    ///
    /// `Ok(None)` means the order's status no longer equals `expected`:
    /// the caller raced another writer and must not overwrite.
    pub async fn update_guarded(
        &self,
        id: &str,
        expected: OrderStatus,
        patch: Value,
    ) -> StoreResult<Option<Order>> {
        let guard = Filter::new().eq("status", status_value(expected));
        match self.store.update(ORDERS, id, patch, Some(&guard)).await? {
            Some(doc) => Ok(Some(decode(doc)?)),
            None => Ok(None),
        }
    }

    /// Atomically mark every open order of a table as paid.
    ///
    /// The bulk-conditional form is the settlement concurrency guard: a
    /// racing second settlement matches zero rows and must treat that as
    /// already-settled.
    pub async fn settle_open_orders(
        &self,
        table_id: &str,
        payment: &PaymentInfo,
        now: DateTime<Utc>,
    ) -> StoreResult<u64> {
        let filter = Filter::new()
            .eq("table_id", table_id)
            .not_in("status", terminal_status_values());
        let patch = json!({
            "status": status_value(OrderStatus::Paid),
            "payment": encode(payment)?,
            "updated_at": encode(&now)?,
        });
        self.store.bulk_update(ORDERS, &filter, patch).await
    }
}

pub(crate) fn status_value(status: OrderStatus) -> Value {
    Value::String(status.to_string())
}

fn terminal_status_values() -> Vec<Value> {
    vec![
        status_value(OrderStatus::Paid),
        status_value(OrderStatus::Cancelled),
    ]
}
