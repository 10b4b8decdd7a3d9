//! 实时广播层
//!
//! - [`PresenceRegistry`]: 在线员工目录 (内存态，进程生命周期)
//! - [`RealtimeRouter`]: 认证连接、角色频道、个人频道、临时房间
//! - [`EventPublisher`]: 领域事件 → 总线消息的发布适配器
//!
//! 传输层 (WebSocket/TCP) 在外部：它只需要在建连时调用
//! [`RealtimeRouter::connect`] 并转发 [`BusMessage`]。投递是
//! fire-and-forget，掉线客户端通过重新读取权威状态恢复，不重放事件。

mod presence;
mod publisher;
mod router;

pub use presence::{ConnectionSender, PresenceRegistry, PresenceStats, StaffConnection};
pub use publisher::EventPublisher;
pub use router::RealtimeRouter;
