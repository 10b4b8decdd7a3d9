//! 数据存储适配层
//!
//! 领域引擎只通过 [`Store`] 这个窄接口访问持久层：
//! `get` / `find` / `create` / `update` / `bulk_update` / `delete`。
//!
//! 并发正确性依赖后两个操作的条件形式：
//! - `update` 带 expected 过滤器时是乐观写入，守卫不匹配返回 `None`，
//!   调用方据此报 Conflict 而不是盲目覆盖；
//! - `bulk_update` 按谓词一次性更新并返回命中行数，结算引擎用它
//!   防止同一张账单被并发结算两次。
//!
//! 文档以 JSON 表示，类型化的仓储层负责编解码 (见 [`repository`])。

pub mod memory;
pub mod repository;

pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

use crate::utils::AppError;

/// 存储层错误 (基础设施错误，永不吞掉)
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Database(e.to_string())
    }
}

/// One filter condition over a top-level document field
#[derive(Debug, Clone, PartialEq)]
pub enum Cond {
    Eq(String, Value),
    In(String, Vec<Value>),
    NotIn(String, Vec<Value>),
}

/// Conjunction of conditions ("all must match")
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conds: Vec<Cond>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conds.push(Cond::Eq(field.to_string(), value.into()));
        self
    }

    pub fn is_in(mut self, field: &str, values: Vec<Value>) -> Self {
        self.conds.push(Cond::In(field.to_string(), values));
        self
    }

    pub fn not_in(mut self, field: &str, values: Vec<Value>) -> Self {
        self.conds.push(Cond::NotIn(field.to_string(), values));
        self
    }

    /// Does the document satisfy every condition?
    pub fn matches(&self, doc: &Value) -> bool {
        self.conds.iter().all(|cond| match cond {
            Cond::Eq(field, value) => doc.get(field) == Some(value),
            Cond::In(field, values) => doc
                .get(field)
                .is_some_and(|v| values.iter().any(|candidate| candidate == v)),
            Cond::NotIn(field, values) => doc
                .get(field)
                .is_none_or(|v| !values.iter().any(|candidate| candidate == v)),
        })
    }
}

/// 事务性文档存储的窄接口
///
/// 实现方保证单文档的 `update` 和整个 `bulk_update` 不被撕裂。
#[async_trait]
pub trait Store: Send + Sync + fmt::Debug {
    /// Fetch one document by id
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Value>>;

    /// Fetch all documents matching the filter
    async fn find(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<Value>>;

    /// Insert a document; an `id` field is generated when absent.
    /// Returns the stored document.
    async fn create(&self, collection: &str, doc: Value) -> StoreResult<Value>;

    /// Shallow-merge `patch` into the document.
    ///
    /// With `expected`, the write only happens while the current document
    /// still matches the guard; `Ok(None)` means the document is absent
    /// or the guard failed (the caller lost a race).
    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Value,
        expected: Option<&Filter>,
    ) -> StoreResult<Option<Value>>;

    /// Shallow-merge `patch` into every document matching the filter in
    /// one atomic pass. Returns the number of documents updated.
    async fn bulk_update(&self, collection: &str, filter: &Filter, patch: Value)
    -> StoreResult<u64>;

    /// Remove a document by id. Returns whether it existed.
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool>;
}
