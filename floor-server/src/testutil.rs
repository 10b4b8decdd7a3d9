//! Shared fixtures for domain engine tests

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use shared::models::{DiningTable, Product, StaffRole, TableStatus};

use crate::auth::CurrentUser;
use crate::db::MemoryStore;
use crate::db::repository::{DiningTableRepository, ProductRepository};

pub fn memory_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub async fn seed_table(store: Arc<MemoryStore>, number: u32, status: TableStatus) -> DiningTable {
    let repo = DiningTableRepository::new(store);
    repo.create(&DiningTable {
        id: Uuid::new_v4().to_string(),
        number,
        capacity: 4,
        status,
        is_active: true,
    })
    .await
    .unwrap()
}

pub async fn seed_product(store: Arc<MemoryStore>, name: &str, price: &str) -> Product {
    let repo = ProductRepository::new(store);
    repo.create(&Product {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        price: dec(price),
        available: true,
        is_active: true,
        category_id: "cat-main".to_string(),
    })
    .await
    .unwrap()
}

pub fn current_user(id: &str, username: &str, role: StaffRole) -> CurrentUser {
    CurrentUser {
        id: id.to_string(),
        username: username.to_string(),
        role,
    }
}
