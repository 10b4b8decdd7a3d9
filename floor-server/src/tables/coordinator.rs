//! TableStateCoordinator - 餐桌台账与人工状态覆盖

use std::sync::Arc;

use uuid::Uuid;

use shared::DomainEvent;
use shared::models::{DiningTable, DiningTableCreate, TableStatus};

use crate::db::Store;
use crate::db::repository::{DiningTableRepository, OrderRepository};
use crate::utils::{AppError, AppResult};

const DEFAULT_CAPACITY: u32 = 4;

pub struct TableStateCoordinator {
    tables: DiningTableRepository,
    orders: OrderRepository,
}

impl TableStateCoordinator {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            tables: DiningTableRepository::new(Arc::clone(&store)),
            orders: OrderRepository::new(store),
        }
    }

    /// Register a new table. Numbers are unique among active tables.
    pub async fn create(&self, input: DiningTableCreate) -> AppResult<DiningTable> {
        if input.number == 0 {
            return Err(AppError::validation("Table number must be positive"));
        }
        let capacity = input.capacity.unwrap_or(DEFAULT_CAPACITY);
        if capacity == 0 {
            return Err(AppError::validation("Table capacity must be positive"));
        }
        if self.tables.find_by_number(input.number).await?.is_some() {
            return Err(AppError::conflict(format!(
                "Table number {} already exists",
                input.number
            )));
        }

        let table = self
            .tables
            .create(&DiningTable {
                id: Uuid::new_v4().to_string(),
                number: input.number,
                capacity,
                status: TableStatus::Free,
                is_active: true,
            })
            .await?;

        tracing::info!(table = table.number, capacity = table.capacity, "Table created");
        Ok(table)
    }

    /// All active tables, ordered by number
    pub async fn list(&self) -> AppResult<Vec<DiningTable>> {
        Ok(self.tables.find_all_active().await?)
    }

    pub async fn get(&self, id: &str) -> AppResult<DiningTable> {
        self.tables
            .find_by_id(id)
            .await?
            .filter(|t| t.is_active)
            .ok_or_else(|| AppError::not_found(format!("Table {} not found", id)))
    }

    /// Manual status override by floor staff.
    ///
    /// Unguarded on purpose: a human override beats whatever the order
    /// lifecycle believed a moment earlier. The broadcast carries both
    /// statuses so clients can reconcile.
    pub async fn set_status(
        &self,
        id: &str,
        status: TableStatus,
    ) -> AppResult<(DiningTable, Vec<DomainEvent>)> {
        let table = self.get(id).await?;
        if table.status == status {
            return Ok((table, Vec::new()));
        }

        let updated = self
            .tables
            .set_status(id, status, None)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Table {} not found", id)))?;

        tracing::info!(
            table = updated.number,
            from = %table.status,
            to = %status,
            "Table status overridden"
        );

        let event = DomainEvent::table_status_changed(&updated, table.status);
        Ok((updated, vec![event]))
    }

    /// Soft-delete a table. Refused while the table is in service or has
    /// open orders; history keeps pointing at the inactive record.
    pub async fn delete(&self, id: &str) -> AppResult<DiningTable> {
        let table = self.get(id).await?;
        if table.status != TableStatus::Free {
            return Err(AppError::conflict(format!(
                "Table {} is {}, settle or clear it first",
                table.number, table.status
            )));
        }
        if !self.orders.open_orders_for_table(id).await?.is_empty() {
            return Err(AppError::conflict(format!(
                "Table {} still has open orders",
                table.number
            )));
        }

        let removed = self
            .tables
            .deactivate(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Table {} not found", id)))?;
        tracing::info!(table = removed.number, "Table deactivated");
        Ok(removed)
    }
}
