//! Shared domain types for the floor server.
//!
//! 这些类型在 floor-server 和 clients 之间共享：
//!
//! - **models**: 餐桌、订单、产品、员工等领域模型
//! - **event**: 领域事件及其广播受众
//! - **message**: 消息总线消息体

pub mod event;
pub mod message;
pub mod models;
pub mod util;

pub use event::{Audience, DomainEvent};
pub use message::BusMessage;
