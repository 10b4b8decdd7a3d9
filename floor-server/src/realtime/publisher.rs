//! Event Publisher
//!
//! 领域操作返回 (新状态, 事件列表)，由这里统一发布到路由器。
//! "提交状态变更" 和 "发布事件" 分为两步，核心逻辑无需传输层即可测试。

use std::sync::Arc;

use shared::{Audience, BusMessage, DomainEvent};

use super::RealtimeRouter;

#[derive(Debug, Clone)]
pub struct EventPublisher {
    router: Arc<RealtimeRouter>,
}

impl EventPublisher {
    pub fn new(router: Arc<RealtimeRouter>) -> Self {
        Self { router }
    }

    /// Fan one event out to its audience
    pub fn publish(&self, event: DomainEvent) {
        let msg = BusMessage::new(event.name.clone(), event.payload);
        match event.audience {
            Audience::All => self.router.notify_all(msg),
            Audience::Role(role) => self.router.notify_role(role, msg),
            // Targeted delivery plus a role-wide fallback broadcast, so
            // no single staff member's absence drops the work item
            Audience::Staff { staff_id, fallback } => {
                self.router.notify_staff(&staff_id, msg.clone());
                self.router.notify_role(fallback, msg);
            }
        }
    }

    pub fn publish_all(&self, events: Vec<DomainEvent>) {
        for event in events {
            self.publish(event);
        }
    }
}
