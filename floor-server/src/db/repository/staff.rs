//! Staff Repository

use std::sync::Arc;

use shared::models::Staff;

use super::{STAFF, decode, encode};
use crate::db::{Store, StoreResult};

#[derive(Debug, Clone)]
pub struct StaffRepository {
    store: Arc<dyn Store>,
}

impl StaffRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn find_by_id(&self, id: &str) -> StoreResult<Option<Staff>> {
        match self.store.get(STAFF, id).await? {
            Some(doc) => Ok(Some(decode(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn create(&self, staff: &Staff) -> StoreResult<Staff> {
        let doc = self.store.create(STAFF, encode(staff)?).await?;
        decode(doc)
    }
}
