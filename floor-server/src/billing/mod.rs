//! 账单与结算
//!
//! 账单是对餐桌未结订单的读时投影；结算把它们一次性标记为已支付。

mod engine;

#[cfg(test)]
mod tests;

pub use engine::BillingEngine;
