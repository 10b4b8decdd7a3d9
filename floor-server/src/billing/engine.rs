//! BillingEngine - 账单投影与结算
//!
//! 结算的并发守卫是批量条件更新本身：两个收银员同时结同一桌时，
//! 后到的一方批量更新命中 0 行，按 "已被结算" 拒绝，绝不二次收款。

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;

use shared::DomainEvent;
use shared::models::{
    Bill, BillLine, PaymentInfo, PaymentMethod, Settlement, TableStatus,
};

use crate::auth::CurrentUser;
use crate::db::Store;
use crate::db::repository::{DiningTableRepository, OrderRepository};
use crate::utils::{AppError, AppResult};

pub struct BillingEngine {
    orders: OrderRepository,
    tables: DiningTableRepository,
}

impl BillingEngine {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            orders: OrderRepository::new(Arc::clone(&store)),
            tables: DiningTableRepository::new(store),
        }
    }

    /// Compute the current bill for a table.
    ///
    /// A fresh projection every call, rolled up by product name in
    /// deterministic (alphabetical) order. Never cached: the open orders
    /// can change between a preview and the settlement that follows it.
    pub async fn bill(&self, table_id: &str) -> AppResult<Bill> {
        let table = self
            .tables
            .find_by_id(table_id)
            .await?
            .filter(|t| t.is_active)
            .ok_or_else(|| AppError::not_found(format!("Table {} not found", table_id)))?;

        let orders = self.orders.open_orders_for_table(table_id).await?;
        if orders.is_empty() {
            return Err(AppError::no_pending_orders(format!(
                "Table {} has no orders to bill",
                table.number
            )));
        }

        let order_ids: Vec<String> = orders.iter().map(|o| o.id.clone()).collect();
        let lines = self.orders.lines_for_orders(&order_ids).await?;

        let mut rollup: BTreeMap<String, (u32, Decimal)> = BTreeMap::new();
        let mut item_count = 0u32;
        for line in &lines {
            let entry = rollup
                .entry(line.product_name.clone())
                .or_insert((0, Decimal::ZERO));
            entry.0 += line.quantity;
            entry.1 += line.subtotal;
            item_count += line.quantity;
        }

        let total = orders.iter().map(|o| o.total).sum();

        Ok(Bill {
            table_id: table.id,
            table_number: table.number,
            total,
            item_count,
            order_count: orders.len() as u32,
            lines: rollup
                .into_iter()
                .map(|(product_name, (quantity, subtotal))| BillLine {
                    product_name,
                    quantity,
                    subtotal,
                })
                .collect(),
            generated_at: Utc::now(),
        })
    }

    /// Settle a table's bill: mark every open order paid, free the table,
    /// and produce the settlement record.
    ///
    /// Cash tenders may exceed the total (change is returned); card and
    /// mobile always capture exactly the total.
    pub async fn settle(
        &self,
        table_id: &str,
        method: PaymentMethod,
        amount_received: Option<Decimal>,
        notes: Option<String>,
        staff: &CurrentUser,
    ) -> AppResult<(Settlement, Vec<DomainEvent>)> {
        let bill = self.bill(table_id).await?;

        let received = match method {
            PaymentMethod::Cash => {
                let received = amount_received.unwrap_or(bill.total);
                if received < bill.total {
                    return Err(AppError::insufficient_payment(format!(
                        "Received {} against a bill of {}",
                        received, bill.total
                    )));
                }
                received
            }
            // Electronic payments capture exactly the amount due
            PaymentMethod::Card | PaymentMethod::Mobile => bill.total,
        };

        let now = Utc::now();
        let payment = PaymentInfo {
            method,
            amount_received: received,
            paid_at: now,
        };

        let settled = self
            .orders
            .settle_open_orders(table_id, &payment, now)
            .await?;
        if settled == 0 {
            // Another cashier won the race between bill() and this write
            return Err(AppError::no_pending_orders(format!(
                "Table {} was already settled",
                bill.table_number
            )));
        }

        let change = if method == PaymentMethod::Cash {
            received - bill.total
        } else {
            Decimal::ZERO
        };

        let settlement = Settlement {
            table_id: bill.table_id.clone(),
            table_number: bill.table_number,
            total: bill.total,
            method,
            amount_received: received,
            change,
            orders_settled: settled as u32,
            settled_by: staff.id.clone(),
            settled_at: now,
            notes,
        };

        tracing::info!(
            table = settlement.table_number,
            total = %settlement.total,
            method = ?settlement.method,
            orders = settlement.orders_settled,
            cashier = %staff.username,
            "Bill settled"
        );

        let mut events = vec![
            DomainEvent::payment_processed(&settlement, &bill),
            DomainEvent::sale_recorded(&settlement),
        ];

        // Paid table goes back into rotation
        if let Some(table) = self.tables.find_by_id(table_id).await?
            && table.status != TableStatus::Free
            && let Some(updated) = self
                .tables
                .set_status(table_id, TableStatus::Free, Some(table.status))
                .await?
        {
            events.push(DomainEvent::table_status_changed(&updated, table.status));
        }

        Ok((settlement, events))
    }
}
