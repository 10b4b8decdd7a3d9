//! Realtime Broadcast Router
//!
//! 认证连接并将领域事件扇出到正确的员工子集：
//!
//! ```text
//! connect(credential) ──► JWT 验证 ──► 员工必须存在且在职
//!        │
//!        ▼
//! PresenceRegistry (角色频道 + 个人频道 + 临时房间)
//!        ▲
//! notify_all / notify_role / notify_staff / notify_room
//! ```
//!
//! 投递语义：fire-and-forget。零接收者不是错误；掉线客户端通过
//! 重新拉取权威状态恢复，服务器不排队补发。

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use shared::BusMessage;
use shared::models::StaffRole;

use super::presence::{ConnectionSender, PresenceRegistry, StaffConnection};
use crate::auth::{JwtError, JwtService};
use crate::db::repository::StaffRepository;
use crate::utils::{AppError, AppResult};

/// 房间操作载荷 (`room.join` / `room.leave`)
#[derive(Debug, serde::Deserialize)]
struct RoomPayload {
    room: String,
}

pub struct RealtimeRouter {
    presence: PresenceRegistry,
    jwt: Arc<JwtService>,
    staff_repo: StaffRepository,
}

impl std::fmt::Debug for RealtimeRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeRouter")
            .field("connections", &self.presence.len())
            .finish()
    }
}

impl RealtimeRouter {
    pub fn new(jwt: Arc<JwtService>, staff_repo: StaffRepository) -> Self {
        Self {
            presence: PresenceRegistry::new(),
            jwt,
            staff_repo,
        }
    }

    pub fn presence(&self) -> &PresenceRegistry {
        &self.presence
    }

    /// Authenticate a credential and register the connection.
    ///
    /// Any failure leaves no trace in the presence registry: the caller
    /// must close the transport with an Unauthorized signal.
    pub async fn connect(
        &self,
        credential: &str,
        sender: ConnectionSender,
    ) -> AppResult<Arc<StaffConnection>> {
        let claims = self.jwt.validate_token(credential).map_err(|e| match e {
            JwtError::ExpiredToken => AppError::token_expired(),
            _ => AppError::unauthorized(),
        })?;

        let staff = self
            .staff_repo
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(AppError::unauthorized)?;
        if !staff.is_active {
            tracing::warn!(target: "security", staff_id = %staff.id, "Inactive staff connect rejected");
            return Err(AppError::unauthorized());
        }

        let connection = Arc::new(StaffConnection::new(
            staff.id.clone(),
            staff.username.clone(),
            staff.role,
            sender,
        ));
        self.presence.register(Arc::clone(&connection));

        tracing::info!(
            staff = %staff.username,
            role = %staff.role,
            connection_id = %connection.id,
            "Staff connected"
        );
        self.push_presence_stats();

        Ok(connection)
    }

    /// Remove a connection. No domain state is rolled back: an order in
    /// flight is unaffected by its creator's connection dropping.
    pub fn disconnect(&self, connection_id: Uuid) {
        if let Some(conn) = self.presence.unregister(connection_id) {
            tracing::info!(
                staff = %conn.username,
                connection_id = %connection_id,
                "Staff disconnected"
            );
            self.push_presence_stats();
        }
    }

    /// Deliver to every member of one role channel
    pub fn notify_role(&self, role: StaffRole, msg: BusMessage) {
        for conn in self.presence.for_role(role) {
            conn.send(msg.clone());
        }
    }

    /// Deliver to one staff member's personal channel only
    pub fn notify_staff(&self, staff_id: &str, msg: BusMessage) {
        for conn in self.presence.for_staff(staff_id) {
            conn.send(msg.clone());
        }
    }

    /// Deliver to every connected staff member
    pub fn notify_all(&self, msg: BusMessage) {
        for conn in self.presence.all() {
            conn.send(msg.clone());
        }
    }

    /// Deliver to every member of an ad-hoc room
    pub fn notify_room(&self, room: &str, msg: BusMessage) {
        for conn in self.presence.for_room(room) {
            conn.send(msg.clone());
        }
    }

    /// Handle one client-initiated signal.
    ///
    /// Client events never mutate domain state; unknown events are
    /// logged and dropped.
    pub fn handle_client_event(&self, connection_id: Uuid, msg: BusMessage) {
        let Some(conn) = self.presence.get(connection_id) else {
            tracing::debug!(connection_id = %connection_id, "Event from unknown connection");
            return;
        };

        match msg.event.as_str() {
            "ping" => conn.send(BusMessage::pong()),
            "room.join" => match msg.parse_payload::<RoomPayload>() {
                Ok(p) => conn.join_room(&p.room),
                Err(e) => tracing::debug!(error = %e, "Malformed room.join payload"),
            },
            "room.leave" => match msg.parse_payload::<RoomPayload>() {
                Ok(p) => conn.leave_room(&p.room),
                Err(e) => tracing::debug!(error = %e, "Malformed room.leave payload"),
            },
            // Role-scoped informational broadcast, e.g. kitchen calling
            // out "86 the special" to every kitchen screen
            "role.notify" => {
                self.notify_role(conn.role, BusMessage::new("role.notify", msg.payload));
            }
            other => {
                tracing::debug!(event = other, "Ignoring unknown client event");
            }
        }
    }

    /// Push per-role connection counts to the admin channel
    fn push_presence_stats(&self) {
        let stats = self.presence.stats();
        self.notify_role(
            StaffRole::Admin,
            BusMessage::new("presence.updated", json!(stats)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtConfig;
    use crate::db::MemoryStore;
    use shared::models::Staff;
    use tokio::sync::mpsc;

    fn jwt() -> Arc<JwtService> {
        Arc::new(JwtService::with_config(JwtConfig {
            secret: "router-test-secret-key-0123456789abcdef".to_string(),
            expiration_minutes: 60,
            issuer: "floor-server".to_string(),
            audience: "floor-staff".to_string(),
        }))
    }

    async fn router_with_staff(staff: &[Staff]) -> (Arc<RealtimeRouter>, Arc<JwtService>) {
        let store = Arc::new(MemoryStore::new());
        let repo = StaffRepository::new(store);
        for s in staff {
            repo.create(s).await.unwrap();
        }
        let jwt = jwt();
        (
            Arc::new(RealtimeRouter::new(Arc::clone(&jwt), repo)),
            jwt,
        )
    }

    fn staff(id: &str, role: StaffRole) -> Staff {
        Staff {
            id: id.to_string(),
            username: id.to_string(),
            role,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_connect_registers_presence() {
        let (router, jwt) = router_with_staff(&[staff("w-1", StaffRole::Waiter)]).await;
        let token = jwt
            .generate_token("w-1", "w-1", StaffRole::Waiter)
            .unwrap();

        let (tx, _rx) = mpsc::unbounded_channel();
        let conn = router.connect(&token, tx).await.unwrap();
        assert_eq!(conn.role, StaffRole::Waiter);
        assert_eq!(router.presence().len(), 1);

        router.disconnect(conn.id);
        assert!(router.presence().is_empty());
    }

    #[tokio::test]
    async fn test_expired_credential_never_registers() {
        let (router, jwt) = router_with_staff(&[staff("w-1", StaffRole::Waiter)]).await;
        let token = jwt
            .generate_expired_token("w-1", "w-1", StaffRole::Waiter)
            .unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let result = router.connect(&token, tx).await;
        assert!(matches!(result, Err(AppError::TokenExpired)));
        assert!(router.presence().is_empty());

        // And receives no role-channel events
        router.notify_role(StaffRole::Waiter, BusMessage::new("order.ready", json!({})));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_inactive_staff_rejected() {
        let mut inactive = staff("w-1", StaffRole::Waiter);
        inactive.is_active = false;
        let (router, jwt) = router_with_staff(&[inactive]).await;
        let token = jwt
            .generate_token("w-1", "w-1", StaffRole::Waiter)
            .unwrap();

        let (tx, _rx) = mpsc::unbounded_channel();
        assert!(matches!(
            router.connect(&token, tx).await,
            Err(AppError::Unauthorized)
        ));
        assert!(router.presence().is_empty());
    }

    #[tokio::test]
    async fn test_role_scoped_fanout() {
        let (router, jwt) = router_with_staff(&[
            staff("w-1", StaffRole::Waiter),
            staff("k-1", StaffRole::Kitchen),
        ])
        .await;

        let (waiter_tx, mut waiter_rx) = mpsc::unbounded_channel();
        let (kitchen_tx, mut kitchen_rx) = mpsc::unbounded_channel();
        let w_token = jwt.generate_token("w-1", "w-1", StaffRole::Waiter).unwrap();
        let k_token = jwt
            .generate_token("k-1", "k-1", StaffRole::Kitchen)
            .unwrap();
        router.connect(&w_token, waiter_tx).await.unwrap();
        router.connect(&k_token, kitchen_tx).await.unwrap();

        router.notify_role(
            StaffRole::Kitchen,
            BusMessage::new("order.created", json!({ "order_id": "o-1" })),
        );

        let received = kitchen_rx.try_recv().unwrap();
        assert_eq!(received.event, "order.created");
        assert!(waiter_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_personal_channel() {
        let (router, jwt) = router_with_staff(&[
            staff("w-1", StaffRole::Waiter),
            staff("w-2", StaffRole::Waiter),
        ])
        .await;

        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let t1 = jwt.generate_token("w-1", "w-1", StaffRole::Waiter).unwrap();
        let t2 = jwt.generate_token("w-2", "w-2", StaffRole::Waiter).unwrap();
        router.connect(&t1, tx1).await.unwrap();
        router.connect(&t2, tx2).await.unwrap();

        router.notify_staff("w-2", BusMessage::new("order.ready", json!({})));
        assert!(rx1.try_recv().is_err());
        assert_eq!(rx2.try_recv().unwrap().event, "order.ready");
    }

    #[tokio::test]
    async fn test_presence_stats_reach_admin() {
        let (router, jwt) = router_with_staff(&[
            staff("a-1", StaffRole::Admin),
            staff("w-1", StaffRole::Waiter),
        ])
        .await;

        let (admin_tx, mut admin_rx) = mpsc::unbounded_channel();
        let a_token = jwt.generate_token("a-1", "a-1", StaffRole::Admin).unwrap();
        router.connect(&a_token, admin_tx).await.unwrap();
        // Admin's own connect pushes stats
        assert_eq!(admin_rx.try_recv().unwrap().event, "presence.updated");

        let (waiter_tx, _waiter_rx) = mpsc::unbounded_channel();
        let w_token = jwt.generate_token("w-1", "w-1", StaffRole::Waiter).unwrap();
        let conn = router.connect(&w_token, waiter_tx).await.unwrap();

        let msg = admin_rx.try_recv().unwrap();
        assert_eq!(msg.event, "presence.updated");
        assert_eq!(msg.payload["waiter"], 1);
        assert_eq!(msg.payload["total"], 2);

        router.disconnect(conn.id);
        let msg = admin_rx.try_recv().unwrap();
        assert_eq!(msg.payload["waiter"], 0);
        assert_eq!(msg.payload["total"], 1);
    }

    #[tokio::test]
    async fn test_rooms_and_ping() {
        let (router, jwt) = router_with_staff(&[staff("w-1", StaffRole::Waiter)]).await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let token = jwt.generate_token("w-1", "w-1", StaffRole::Waiter).unwrap();
        let conn = router.connect(&token, tx).await.unwrap();

        router.handle_client_event(
            conn.id,
            BusMessage::new("room.join", json!({ "room": "terrace" })),
        );
        router.notify_room("terrace", BusMessage::new("shift.note", json!({})));
        assert_eq!(rx.try_recv().unwrap().event, "shift.note");

        router.handle_client_event(
            conn.id,
            BusMessage::new("room.leave", json!({ "room": "terrace" })),
        );
        router.notify_room("terrace", BusMessage::new("shift.note", json!({})));
        assert!(rx.try_recv().is_err());

        router.handle_client_event(conn.id, BusMessage::new("ping", json!({})));
        assert_eq!(rx.try_recv().unwrap().event, "pong");
    }
}
