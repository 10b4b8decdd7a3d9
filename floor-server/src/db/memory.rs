//! 内存存储实现
//!
//! 单把 `parking_lot::RwLock` 覆盖所有集合：每个写操作整体持锁，
//! 天然满足 [`Store`](super::Store) 对条件更新与批量更新的原子性要求。
//! 用于测试和单机运行；生产部署换成真正的数据库适配器即可。

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

use super::{Filter, Store, StoreError, StoreResult};

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, HashMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Shallow-merge patch fields into the document
fn apply_patch(doc: &mut Value, patch: &Value) -> StoreResult<()> {
    let patch_obj = patch
        .as_object()
        .ok_or_else(|| StoreError::Backend("patch must be a JSON object".to_string()))?;
    let doc_obj = doc
        .as_object_mut()
        .ok_or_else(|| StoreError::Backend("document is not a JSON object".to_string()))?;
    for (key, value) in patch_obj {
        doc_obj.insert(key.clone(), value.clone());
    }
    Ok(())
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Value>> {
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn find(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<Value>> {
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| filter.matches(doc))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create(&self, collection: &str, mut doc: Value) -> StoreResult<Value> {
        let id = match doc.get("id").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                let id = Uuid::new_v4().to_string();
                apply_patch(&mut doc, &serde_json::json!({ "id": id }))?;
                id
            }
        };

        let mut collections = self.collections.write();
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id, doc.clone());
        Ok(doc)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Value,
        expected: Option<&Filter>,
    ) -> StoreResult<Option<Value>> {
        let mut collections = self.collections.write();
        let Some(doc) = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
        else {
            return Ok(None);
        };

        if let Some(guard) = expected
            && !guard.matches(doc)
        {
            return Ok(None);
        }

        apply_patch(doc, &patch)?;
        Ok(Some(doc.clone()))
    }

    async fn bulk_update(
        &self,
        collection: &str,
        filter: &Filter,
        patch: Value,
    ) -> StoreResult<u64> {
        let mut collections = self.collections.write();
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };

        let mut updated = 0u64;
        for doc in docs.values_mut() {
            if filter.matches(doc) {
                apply_patch(doc, &patch)?;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool> {
        let mut collections = self.collections.write();
        Ok(collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .is_some())
    }
}
