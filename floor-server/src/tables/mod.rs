//! 餐桌管理
//!
//! 餐桌的日常状态变化由订单生命周期驱动；这里是楼面管理的手动入口，
//! 包括建桌、删桌和人工状态覆盖。

mod coordinator;

#[cfg(test)]
mod tests;

pub use coordinator::TableStateCoordinator;
