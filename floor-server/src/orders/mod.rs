//! 订单生命周期管理
//!
//! 订单状态机以及它对餐桌状态的副作用都在这里。

mod manager;


pub use manager::OrderLifecycleManager;
