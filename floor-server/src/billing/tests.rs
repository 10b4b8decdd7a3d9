use std::sync::Arc;

use shared::models::{OrderLineInput, OrderStatus, PaymentMethod, StaffRole, TableStatus};

use super::BillingEngine;
use crate::db::repository::{DiningTableRepository, OrderRepository};
use crate::orders::OrderLifecycleManager;
use crate::testutil::{current_user, dec, memory_store, seed_product, seed_table};
use crate::utils::AppError;

fn line(product_id: &str, quantity: u32) -> OrderLineInput {
    OrderLineInput {
        product_id: product_id.to_string(),
        quantity,
    }
}

/// Table with two open orders: $25.00 (2x burger) and $19.00 (1x burger
/// plus 2x cola at 3.25). Bill total $44.00.
async fn seed_billable_table(
    store: Arc<crate::db::MemoryStore>,
) -> (shared::models::DiningTable, Vec<shared::models::Order>) {
    let table = seed_table(Arc::clone(&store), 9, TableStatus::Free).await;
    let burger = seed_product(Arc::clone(&store), "Burger", "12.50").await;
    let cola = seed_product(Arc::clone(&store), "Cola", "3.25").await;
    let waiter = current_user("staff-1", "alice", StaffRole::Waiter);

    let manager = OrderLifecycleManager::new(store);
    let (first, _) = manager
        .create(&table.id, &waiter, vec![line(&burger.id, 2)], None)
        .await
        .unwrap();
    let (second, _) = manager
        .create(
            &table.id,
            &waiter,
            vec![line(&burger.id, 1), line(&cola.id, 2)],
            None,
        )
        .await
        .unwrap();

    (table, vec![first, second])
}

#[tokio::test]
async fn test_bill_rolls_up_lines_across_orders() {
    let store = memory_store();
    let (table, _) = seed_billable_table(Arc::clone(&store)).await;

    let engine = BillingEngine::new(store);
    let bill = engine.bill(&table.id).await.unwrap();

    assert_eq!(bill.total, dec("44.00"));
    assert_eq!(bill.order_count, 2);
    assert_eq!(bill.item_count, 5);

    // Rollup is alphabetical by product name
    assert_eq!(bill.lines.len(), 2);
    assert_eq!(bill.lines[0].product_name, "Burger");
    assert_eq!(bill.lines[0].quantity, 3);
    assert_eq!(bill.lines[0].subtotal, dec("37.50"));
    assert_eq!(bill.lines[1].product_name, "Cola");
    assert_eq!(bill.lines[1].quantity, 2);
    assert_eq!(bill.lines[1].subtotal, dec("6.50"));
}

#[tokio::test]
async fn test_bill_excludes_cancelled_orders() {
    let store = memory_store();
    let (table, orders) = seed_billable_table(Arc::clone(&store)).await;

    let manager = OrderLifecycleManager::new(store.clone());
    manager
        .cancel(&orders[1].id, "sent back".to_string())
        .await
        .unwrap();

    let engine = BillingEngine::new(store);
    let bill = engine.bill(&table.id).await.unwrap();
    assert_eq!(bill.total, dec("25.00"));
    assert_eq!(bill.order_count, 1);
}

#[tokio::test]
async fn test_bill_requires_open_orders() {
    let store = memory_store();
    let table = seed_table(Arc::clone(&store), 2, TableStatus::Free).await;

    let engine = BillingEngine::new(store);
    let err = engine.bill(&table.id).await.unwrap_err();
    assert!(matches!(err, AppError::NoPendingOrders(_)));

    let err = engine.bill("no-such-table").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_cash_settlement_computes_change_and_frees_table() {
    let store = memory_store();
    let (table, orders) = seed_billable_table(Arc::clone(&store)).await;
    let cashier = current_user("staff-9", "carol", StaffRole::Cashier);

    let engine = BillingEngine::new(store.clone());
    let (settlement, events) = engine
        .settle(
            &table.id,
            PaymentMethod::Cash,
            Some(dec("50.00")),
            None,
            &cashier,
        )
        .await
        .unwrap();

    assert_eq!(settlement.total, dec("44.00"));
    assert_eq!(settlement.amount_received, dec("50.00"));
    assert_eq!(settlement.change, dec("6.00"));
    assert_eq!(settlement.orders_settled, 2);
    assert_eq!(settlement.settled_by, "staff-9");

    let names: Vec<&str> = events.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["payment.processed", "sale.recorded", "table.statusChanged"]
    );

    // Every order is now paid and carries the payment record
    let repo = OrderRepository::new(store.clone());
    for order in &orders {
        let order = repo.find_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
        let payment = order.payment.unwrap();
        assert_eq!(payment.method, PaymentMethod::Cash);
        assert_eq!(payment.amount_received, dec("50.00"));
    }

    let table = DiningTableRepository::new(store)
        .find_by_id(&table.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(table.status, TableStatus::Free);
}

#[tokio::test]
async fn test_cash_settlement_rejects_short_payment() {
    let store = memory_store();
    let (table, _) = seed_billable_table(Arc::clone(&store)).await;
    let cashier = current_user("staff-9", "carol", StaffRole::Cashier);

    let engine = BillingEngine::new(store.clone());
    let err = engine
        .settle(
            &table.id,
            PaymentMethod::Cash,
            Some(dec("30.00")),
            None,
            &cashier,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientPayment(_)));

    // Nothing was written
    let repo = OrderRepository::new(store);
    let open = repo.open_orders_for_table(&table.id).await.unwrap();
    assert_eq!(open.len(), 2);
}

#[tokio::test]
async fn test_card_settlement_captures_exact_total() {
    let store = memory_store();
    let (table, _) = seed_billable_table(Arc::clone(&store)).await;
    let cashier = current_user("staff-9", "carol", StaffRole::Cashier);

    let engine = BillingEngine::new(store);
    // An over-tender on card is ignored, not turned into change
    let (settlement, _) = engine
        .settle(
            &table.id,
            PaymentMethod::Card,
            Some(dec("50.00")),
            Some("split with voucher".to_string()),
            &cashier,
        )
        .await
        .unwrap();

    assert_eq!(settlement.amount_received, dec("44.00"));
    assert_eq!(settlement.change, dec("0"));
    assert_eq!(settlement.notes.as_deref(), Some("split with voucher"));
}

#[tokio::test]
async fn test_second_settlement_is_rejected() {
    let store = memory_store();
    let (table, _) = seed_billable_table(Arc::clone(&store)).await;
    let cashier = current_user("staff-9", "carol", StaffRole::Cashier);

    let engine = BillingEngine::new(store);
    engine
        .settle(&table.id, PaymentMethod::Cash, None, None, &cashier)
        .await
        .unwrap();

    let err = engine
        .settle(&table.id, PaymentMethod::Cash, None, None, &cashier)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NoPendingOrders(_)));
}

#[tokio::test]
async fn test_concurrent_settlements_only_one_wins() {
    let store = memory_store();
    let (table, _) = seed_billable_table(Arc::clone(&store)).await;
    let cashier = current_user("staff-9", "carol", StaffRole::Cashier);

    let engine = Arc::new(BillingEngine::new(store));
    let a = engine.settle(&table.id, PaymentMethod::Cash, None, None, &cashier);
    let b = engine.settle(&table.id, PaymentMethod::Card, None, None, &cashier);
    let (a, b) = tokio::join!(a, b);

    // Exactly one side charged the table
    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
    let loser = if a.is_ok() { b } else { a };
    assert!(matches!(loser.unwrap_err(), AppError::NoPendingOrders(_)));
}
