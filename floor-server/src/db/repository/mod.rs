//! 类型化仓储层
//!
//! 每个仓储包装 [`Store`](super::Store)，负责 JSON 编解码和集合命名。
//! 仓储只做数据访问，领域规则留在各引擎里。

mod dining_table;
mod order;
mod product;
mod staff;

pub use dining_table::DiningTableRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use staff::StaffRepository;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{StoreError, StoreResult};

pub const TABLES: &str = "dining_table";
pub const ORDERS: &str = "order";
pub const ORDER_LINES: &str = "order_line";
pub const PRODUCTS: &str = "product";
pub const STAFF: &str = "staff";

pub(crate) fn encode<T: Serialize>(value: &T) -> StoreResult<Value> {
    serde_json::to_value(value).map_err(StoreError::from)
}

pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> StoreResult<T> {
    serde_json::from_value(value).map_err(StoreError::from)
}

pub(crate) fn decode_all<T: DeserializeOwned>(values: Vec<Value>) -> StoreResult<Vec<T>> {
    values.into_iter().map(decode).collect()
}
