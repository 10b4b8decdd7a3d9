//! OrderLifecycleManager - 订单状态机与餐桌副作用
//!
//! # 操作流程
//!
//! ```text
//! create(table, staff, lines)
//!     ├─ 1. 校验餐桌、产品、数量
//!     ├─ 2. 快照单价/品名，计算总额
//!     ├─ 3. 持久化订单行，再写订单记录 (提交点)
//!     ├─ 4. Free 餐桌 → Occupied (副作用归本模块所有)
//!     └─ 5. 返回 (订单, 待发布事件)
//! ```
//!
//! 并发规则：所有状态写入都带 expected-status 守卫。输掉竞争的
//! 一方得到 Conflict，而不是悄悄覆盖别人的写入 (例如 Ready→Delivered
//! 与 Ready→Cancelled 同时发生时只有一个能成功)。

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use shared::DomainEvent;
use shared::models::{
    CancellationInfo, Order, OrderLine, OrderLineInput, OrderStatus, TableStatus,
};

use crate::auth::CurrentUser;
use crate::db::Store;
use crate::db::repository::{
    DiningTableRepository, OrderRepository, ProductRepository,
};
use crate::utils::{AppError, AppResult};

pub struct OrderLifecycleManager {
    orders: OrderRepository,
    tables: DiningTableRepository,
    products: ProductRepository,
}

impl OrderLifecycleManager {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            orders: OrderRepository::new(Arc::clone(&store)),
            tables: DiningTableRepository::new(Arc::clone(&store)),
            products: ProductRepository::new(store),
        }
    }

    /// Create a new order for a table.
    ///
    /// Snapshots unit prices at this instant; a Free table becomes
    /// Occupied as a side effect owned here, not by the caller.
    pub async fn create(
        &self,
        table_id: &str,
        staff: &CurrentUser,
        lines: Vec<OrderLineInput>,
        notes: Option<String>,
    ) -> AppResult<(Order, Vec<DomainEvent>)> {
        let table = self
            .tables
            .find_by_id(table_id)
            .await?
            .filter(|t| t.is_active)
            .ok_or_else(|| AppError::not_found(format!("Table {} not found", table_id)))?;

        let now = Utc::now();
        let order_id = Uuid::new_v4().to_string();
        let (order_lines, total) = self.build_lines(&order_id, &lines).await?;

        let order = Order {
            id: order_id,
            table_id: table.id.clone(),
            created_by: staff.id.clone(),
            status: OrderStatus::New,
            total,
            notes,
            payment: None,
            cancellation: None,
            created_at: now,
            updated_at: now,
        };

        // Lines land first; the order record is the commit point. A failed
        // write leaves no visible order and the lines are taken back out.
        self.write_lines(&order_lines).await?;
        let order = match self.orders.create(&order).await {
            Ok(order) => order,
            Err(e) => {
                self.remove_lines(&order_lines).await;
                return Err(e.into());
            }
        };

        let mut events = vec![DomainEvent::order_created(&order)];

        // First order on a free table occupies it
        if table.status == TableStatus::Free
            && let Some(updated) = self
                .tables
                .set_status(&table.id, TableStatus::Occupied, Some(TableStatus::Free))
                .await?
        {
            events.push(DomainEvent::table_status_changed(
                &updated,
                TableStatus::Free,
            ));
        }

        tracing::info!(
            order_id = %order.id,
            table = table.number,
            staff = %staff.username,
            total = %order.total,
            "Order created"
        );

        Ok((order, events))
    }

    /// Append lines to an existing order.
    ///
    /// The total is recomputed by addition. A Delivered order reverts to
    /// InKitchen: food added to a served table re-opens kitchen work.
    pub async fn append_lines(
        &self,
        order_id: &str,
        lines: Vec<OrderLineInput>,
    ) -> AppResult<(Order, Vec<DomainEvent>)> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", order_id)))?;

        if order.status.is_terminal() {
            return Err(AppError::conflict(format!(
                "Cannot add items to a {} order",
                order.status
            )));
        }

        let (order_lines, added) = self.build_lines(order_id, &lines).await?;
        let new_total = order.total + added;
        let new_status = if order.status == OrderStatus::Delivered {
            OrderStatus::InKitchen
        } else {
            order.status
        };

        // Lines land first; the guarded total/status update is the commit
        // point, so the stored total never runs ahead of the stored lines.
        self.write_lines(&order_lines).await?;

        let patch = json!({
            "total": new_total,
            "status": new_status.to_string(),
            "updated_at": Utc::now(),
        });
        let updated = match self.orders.update_guarded(order_id, order.status, patch).await {
            Ok(Some(updated)) => updated,
            Ok(None) => {
                self.remove_lines(&order_lines).await;
                return Err(AppError::conflict(format!(
                    "Order {} was modified concurrently",
                    order_id
                )));
            }
            Err(e) => {
                self.remove_lines(&order_lines).await;
                return Err(e.into());
            }
        };

        tracing::info!(
            order_id = %updated.id,
            added = order_lines.len(),
            total = %updated.total,
            "Order lines appended"
        );

        Ok((updated.clone(), vec![DomainEvent::order_updated(&updated)]))
    }

    /// Move an order along the state machine.
    ///
    /// Only the enumerated edges are legal; Paid is settlement-only and
    /// always rejected here. Edge legality is checked before argument
    /// validation, so cancelling a terminal order reports InvalidTransition
    /// whatever the reason looks like.
    pub async fn transition(
        &self,
        order_id: &str,
        target: OrderStatus,
        reason: Option<String>,
    ) -> AppResult<(Order, Vec<DomainEvent>)> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", order_id)))?;

        if target == OrderStatus::Paid {
            return Err(AppError::invalid_transition(
                "Orders are marked paid by bill settlement, never directly",
            ));
        }

        if !order.status.can_transition_to(target) {
            return Err(AppError::invalid_transition(format!(
                "Cannot transition order from {} to {}",
                order.status, target
            )));
        }

        let reason = if target == OrderStatus::Cancelled {
            let reason = reason.map(|r| r.trim().to_string()).unwrap_or_default();
            if reason.is_empty() {
                return Err(AppError::validation("Cancellation requires a reason"));
            }
            Some(reason)
        } else {
            None
        };

        let now = Utc::now();
        let mut patch = json!({
            "status": target.to_string(),
            "updated_at": now,
        });
        if let Some(reason) = &reason {
            patch["cancellation"] = serde_json::to_value(CancellationInfo {
                reason: reason.clone(),
                cancelled_at: now,
            })
            .map_err(|e| AppError::internal(e.to_string()))?;
        }

        let updated = self
            .orders
            .update_guarded(order_id, order.status, patch)
            .await?
            .ok_or_else(|| {
                AppError::conflict(format!(
                    "Order {} changed status concurrently, re-read before retrying",
                    order_id
                ))
            })?;

        tracing::info!(
            order_id = %updated.id,
            from = %order.status,
            to = %target,
            "Order transitioned"
        );

        let mut events = Vec::new();
        match target {
            OrderStatus::Ready => events.push(DomainEvent::order_ready(&updated)),
            OrderStatus::Delivered => events.push(DomainEvent::order_delivered(&updated)),
            OrderStatus::Cancelled => {
                events.push(DomainEvent::order_cancelled(&updated));
                // Last open order gone → table reverts to Free
                if let Some(event) = self.release_table_if_idle(&updated.table_id).await? {
                    events.push(event);
                }
            }
            _ => {}
        }

        Ok((updated, events))
    }

    /// Cancel an order, with a mandatory reason
    pub async fn cancel(
        &self,
        order_id: &str,
        reason: String,
    ) -> AppResult<(Order, Vec<DomainEvent>)> {
        self.transition(order_id, OrderStatus::Cancelled, Some(reason))
            .await
    }

    /// Free the table when no open orders remain on it
    async fn release_table_if_idle(&self, table_id: &str) -> AppResult<Option<DomainEvent>> {
        if !self.orders.open_orders_for_table(table_id).await?.is_empty() {
            return Ok(None);
        }
        let Some(table) = self.tables.find_by_id(table_id).await? else {
            return Ok(None);
        };
        if table.status == TableStatus::Free {
            return Ok(None);
        }
        match self
            .tables
            .set_status(table_id, TableStatus::Free, Some(table.status))
            .await?
        {
            Some(updated) => Ok(Some(DomainEvent::table_status_changed(
                &updated,
                table.status,
            ))),
            // Lost a race against another writer; their transition wins
            None => Ok(None),
        }
    }

    /// Write a batch of lines; a mid-batch failure removes the ones
    /// already written before the error propagates
    async fn write_lines(&self, lines: &[OrderLine]) -> AppResult<()> {
        for (written, line) in lines.iter().enumerate() {
            if let Err(e) = self.orders.create_line(line).await {
                self.remove_lines(&lines[..written]).await;
                return Err(e.into());
            }
        }
        Ok(())
    }

    /// Best-effort compensation for a write that will not be committed
    async fn remove_lines(&self, lines: &[OrderLine]) {
        for line in lines {
            if let Err(e) = self.orders.delete_line(&line.id).await {
                tracing::warn!(
                    line_id = %line.id,
                    error = %e,
                    "Failed to remove order line from an aborted write"
                );
            }
        }
    }

    /// Validate line inputs and snapshot product prices into order lines
    async fn build_lines(
        &self,
        order_id: &str,
        lines: &[OrderLineInput],
    ) -> AppResult<(Vec<OrderLine>, Decimal)> {
        if lines.is_empty() {
            return Err(AppError::validation("Order must contain at least one line"));
        }

        let mut order_lines = Vec::with_capacity(lines.len());
        let mut total = Decimal::ZERO;
        for input in lines {
            if input.quantity == 0 {
                return Err(AppError::validation("Line quantity must be positive"));
            }
            let product = self
                .products
                .find_by_id(&input.product_id)
                .await?
                .ok_or_else(|| {
                    AppError::not_found(format!("Product {} not found", input.product_id))
                })?;
            if !product.is_active || !product.available {
                return Err(AppError::validation(format!(
                    "Product '{}' is not available",
                    product.name
                )));
            }

            let subtotal = product.price * Decimal::from(input.quantity);
            total += subtotal;
            order_lines.push(OrderLine {
                id: Uuid::new_v4().to_string(),
                order_id: order_id.to_string(),
                product_id: product.id,
                product_name: product.name,
                quantity: input.quantity,
                unit_price: product.price,
                subtotal,
            });
        }

        Ok((order_lines, total))
    }
}
