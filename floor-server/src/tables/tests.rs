use std::sync::Arc;

use shared::models::{DiningTableCreate, OrderLineInput, StaffRole, TableStatus};

use super::TableStateCoordinator;
use crate::orders::OrderLifecycleManager;
use crate::testutil::{current_user, memory_store, seed_product, seed_table};
use crate::utils::AppError;

fn create_input(number: u32, capacity: Option<u32>) -> DiningTableCreate {
    DiningTableCreate { number, capacity }
}

#[tokio::test]
async fn test_create_table_defaults_and_uniqueness() {
    let store = memory_store();
    let coordinator = TableStateCoordinator::new(store);

    let table = coordinator.create(create_input(7, None)).await.unwrap();
    assert_eq!(table.number, 7);
    assert_eq!(table.capacity, 4);
    assert_eq!(table.status, TableStatus::Free);
    assert!(table.is_active);

    let err = coordinator
        .create(create_input(7, Some(2)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_create_table_validation() {
    let store = memory_store();
    let coordinator = TableStateCoordinator::new(store);

    let err = coordinator.create(create_input(0, None)).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = coordinator
        .create(create_input(3, Some(0)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_deleted_number_can_be_reused() {
    let store = memory_store();
    let coordinator = TableStateCoordinator::new(store);

    let table = coordinator.create(create_input(7, None)).await.unwrap();
    coordinator.delete(&table.id).await.unwrap();

    // Inactive tables release their number
    let replacement = coordinator.create(create_input(7, Some(6))).await.unwrap();
    assert_ne!(replacement.id, table.id);
    assert_eq!(replacement.capacity, 6);
}

#[tokio::test]
async fn test_list_is_sorted_and_skips_inactive() {
    let store = memory_store();
    let coordinator = TableStateCoordinator::new(store);

    coordinator.create(create_input(3, None)).await.unwrap();
    let second = coordinator.create(create_input(1, None)).await.unwrap();
    coordinator.create(create_input(2, None)).await.unwrap();
    coordinator.delete(&second.id).await.unwrap();

    let numbers: Vec<u32> = coordinator
        .list()
        .await
        .unwrap()
        .iter()
        .map(|t| t.number)
        .collect();
    assert_eq!(numbers, vec![2, 3]);
}

#[tokio::test]
async fn test_manual_override_broadcasts_both_statuses() {
    let store = memory_store();
    let table = seed_table(Arc::clone(&store), 4, TableStatus::Occupied).await;
    let coordinator = TableStateCoordinator::new(store);

    let (updated, events) = coordinator
        .set_status(&table.id, TableStatus::BillRequested)
        .await
        .unwrap();
    assert_eq!(updated.status, TableStatus::BillRequested);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name, "table.statusChanged");
    assert_eq!(events[0].payload["previous_status"], "occupied");
    assert_eq!(events[0].payload["new_status"], "bill_requested");
}

#[tokio::test]
async fn test_noop_override_emits_nothing() {
    let store = memory_store();
    let table = seed_table(Arc::clone(&store), 4, TableStatus::Free).await;
    let coordinator = TableStateCoordinator::new(store);

    let (_, events) = coordinator
        .set_status(&table.id, TableStatus::Free)
        .await
        .unwrap();
    assert!(events.is_empty());
}

#[tokio::test]
async fn test_delete_refuses_tables_in_service() {
    let store = memory_store();
    let table = seed_table(Arc::clone(&store), 4, TableStatus::Free).await;
    let burger = seed_product(Arc::clone(&store), "Burger", "12.50").await;
    let waiter = current_user("staff-1", "alice", StaffRole::Waiter);

    let manager = OrderLifecycleManager::new(store.clone());
    manager
        .create(
            &table.id,
            &waiter,
            vec![OrderLineInput {
                product_id: burger.id,
                quantity: 1,
            }],
            None,
        )
        .await
        .unwrap();

    let coordinator = TableStateCoordinator::new(store);
    let err = coordinator.delete(&table.id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}
