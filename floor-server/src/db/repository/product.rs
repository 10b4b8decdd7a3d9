//! Product Repository

use std::sync::Arc;

use shared::models::Product;

use super::{PRODUCTS, decode, encode};
use crate::db::{Store, StoreResult};

#[derive(Debug, Clone)]
pub struct ProductRepository {
    store: Arc<dyn Store>,
}

impl ProductRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn find_by_id(&self, id: &str) -> StoreResult<Option<Product>> {
        match self.store.get(PRODUCTS, id).await? {
            Some(doc) => Ok(Some(decode(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn create(&self, product: &Product) -> StoreResult<Product> {
        let doc = self.store.create(PRODUCTS, encode(product)?).await?;
        decode(doc)
    }
}
