//! Dining Table Repository

use std::sync::Arc;

use serde_json::{Value, json};
use shared::models::{DiningTable, TableStatus};

use super::{TABLES, decode, decode_all, encode};
use crate::db::{Filter, Store, StoreResult};

#[derive(Debug, Clone)]
pub struct DiningTableRepository {
    store: Arc<dyn Store>,
}

impl DiningTableRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Find table by id
    pub async fn find_by_id(&self, id: &str) -> StoreResult<Option<DiningTable>> {
        match self.store.get(TABLES, id).await? {
            Some(doc) => Ok(Some(decode(doc)?)),
            None => Ok(None),
        }
    }

    /// Find an active table by its human-facing number
    pub async fn find_by_number(&self, number: u32) -> StoreResult<Option<DiningTable>> {
        let filter = Filter::new().eq("number", number).eq("is_active", true);
        let mut tables: Vec<DiningTable> = decode_all(self.store.find(TABLES, &filter).await?)?;
        Ok(tables.pop())
    }

    /// All active tables
    pub async fn find_all_active(&self) -> StoreResult<Vec<DiningTable>> {
        let filter = Filter::new().eq("is_active", true);
        let mut tables: Vec<DiningTable> = decode_all(self.store.find(TABLES, &filter).await?)?;
        tables.sort_by_key(|t| t.number);
        Ok(tables)
    }

    /// Create a new dining table
    pub async fn create(&self, table: &DiningTable) -> StoreResult<DiningTable> {
        let doc = self.store.create(TABLES, encode(table)?).await?;
        decode(doc)
    }

    /// Write a new status.
    ///
    /// With `expected`, the write only happens while the table still has
    /// that status; `Ok(None)` means the guard failed.
    pub async fn set_status(
        &self,
        id: &str,
        status: TableStatus,
        expected: Option<TableStatus>,
    ) -> StoreResult<Option<DiningTable>> {
        let guard = expected.map(|e| Filter::new().eq("status", status_value(e)));
        let patch = json!({ "status": status_value(status) });
        match self
            .store
            .update(TABLES, id, patch, guard.as_ref())
            .await?
        {
            Some(doc) => Ok(Some(decode(doc)?)),
            None => Ok(None),
        }
    }

    /// Soft delete
    pub async fn deactivate(&self, id: &str) -> StoreResult<Option<DiningTable>> {
        match self
            .store
            .update(TABLES, id, json!({ "is_active": false }), None)
            .await?
        {
            Some(doc) => Ok(Some(decode(doc)?)),
            None => Ok(None),
        }
    }
}

pub(crate) fn status_value(status: TableStatus) -> Value {
    Value::String(status.to_string())
}
