//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product entity
///
/// `available` 是每日可售开关 (售罄时关闭)，`is_active` 是软删除标记。
/// 两者的变化都会广播，但不会回溯修改已有订单行的快照价格。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub available: bool,
    pub is_active: bool,
    pub category_id: String,
}
