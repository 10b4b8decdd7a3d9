//! Presence Registry
//!
//! 在线员工目录。唯一的长生命周期进程内可变结构，只在连接建立和
//! 断开时变化。注册是单条 DashMap 插入：一个连接要么完整可见
//! (角色频道 + 个人频道)，要么完全不可见，不存在半注册状态。

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use shared::BusMessage;
use shared::models::StaffRole;

/// Outbound half of one staff connection
pub type ConnectionSender = mpsc::UnboundedSender<BusMessage>;

/// One authenticated staff connection (never persisted)
#[derive(Debug)]
pub struct StaffConnection {
    pub id: Uuid,
    pub staff_id: String,
    pub username: String,
    pub role: StaffRole,
    sender: ConnectionSender,
    /// Ad-hoc room memberships beyond the fixed role/personal channels
    rooms: Mutex<HashSet<String>>,
}

impl StaffConnection {
    pub fn new(
        staff_id: String,
        username: String,
        role: StaffRole,
        sender: ConnectionSender,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            staff_id,
            username,
            role,
            sender,
            rooms: Mutex::new(HashSet::new()),
        }
    }

    /// Fire-and-forget delivery; a closed receiver is not an error
    pub fn send(&self, msg: BusMessage) {
        if self.sender.send(msg).is_err() {
            tracing::debug!(connection_id = %self.id, "Dropped message for closed connection");
        }
    }

    pub fn join_room(&self, room: &str) {
        self.rooms.lock().insert(room.to_string());
    }

    pub fn leave_room(&self, room: &str) {
        self.rooms.lock().remove(room);
    }

    pub fn in_room(&self, room: &str) -> bool {
        self.rooms.lock().contains(room)
    }
}

/// Aggregate connection statistics, recomputed on every connect and
/// disconnect and pushed to the admin role channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceStats {
    pub total: usize,
    pub waiter: usize,
    pub kitchen: usize,
    pub cashier: usize,
    pub admin: usize,
}

/// 在线员工目录
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    connections: DashMap<Uuid, Arc<StaffConnection>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection (single atomic insert)
    pub fn register(&self, connection: Arc<StaffConnection>) {
        self.connections.insert(connection.id, connection);
    }

    /// Remove a connection, returning it if it was registered
    pub fn unregister(&self, connection_id: Uuid) -> Option<Arc<StaffConnection>> {
        self.connections
            .remove(&connection_id)
            .map(|(_, conn)| conn)
    }

    pub fn get(&self, connection_id: Uuid) -> Option<Arc<StaffConnection>> {
        self.connections
            .get(&connection_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// All connections, snapshot order unspecified
    pub fn all(&self) -> Vec<Arc<StaffConnection>> {
        self.connections
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Every connection in one role channel
    pub fn for_role(&self, role: StaffRole) -> Vec<Arc<StaffConnection>> {
        self.connections
            .iter()
            .filter(|entry| entry.value().role == role)
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Every connection on one staff member's personal channel
    pub fn for_staff(&self, staff_id: &str) -> Vec<Arc<StaffConnection>> {
        self.connections
            .iter()
            .filter(|entry| entry.value().staff_id == staff_id)
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Every connection in an ad-hoc room
    pub fn for_room(&self, room: &str) -> Vec<Arc<StaffConnection>> {
        self.connections
            .iter()
            .filter(|entry| entry.value().in_room(room))
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Recompute per-role counts
    pub fn stats(&self) -> PresenceStats {
        let mut stats = PresenceStats {
            total: 0,
            waiter: 0,
            kitchen: 0,
            cashier: 0,
            admin: 0,
        };
        for entry in self.connections.iter() {
            stats.total += 1;
            match entry.value().role {
                StaffRole::Waiter => stats.waiter += 1,
                StaffRole::Kitchen => stats.kitchen += 1,
                StaffRole::Cashier => stats.cashier += 1,
                StaffRole::Admin => stats.admin += 1,
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection(staff_id: &str, role: StaffRole) -> Arc<StaffConnection> {
        let (tx, _rx) = mpsc::unbounded_channel();
        Arc::new(StaffConnection::new(
            staff_id.to_string(),
            staff_id.to_string(),
            role,
            tx,
        ))
    }

    #[test]
    fn test_register_and_stats() {
        let registry = PresenceRegistry::new();
        registry.register(connection("w-1", StaffRole::Waiter));
        registry.register(connection("w-2", StaffRole::Waiter));
        registry.register(connection("k-1", StaffRole::Kitchen));

        let stats = registry.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.waiter, 2);
        assert_eq!(stats.kitchen, 1);
        assert_eq!(stats.admin, 0);

        assert_eq!(registry.for_role(StaffRole::Waiter).len(), 2);
        assert_eq!(registry.for_staff("k-1").len(), 1);
    }

    #[test]
    fn test_unregister_removes_connection() {
        let registry = PresenceRegistry::new();
        let conn = connection("w-1", StaffRole::Waiter);
        let id = conn.id;
        registry.register(conn);
        assert_eq!(registry.len(), 1);

        let removed = registry.unregister(id).unwrap();
        assert_eq!(removed.staff_id, "w-1");
        assert!(registry.is_empty());
        assert!(registry.unregister(id).is_none());
    }

    #[test]
    fn test_rooms() {
        let registry = PresenceRegistry::new();
        let conn = connection("w-1", StaffRole::Waiter);
        registry.register(Arc::clone(&conn));

        assert!(registry.for_room("terrace").is_empty());
        conn.join_room("terrace");
        assert_eq!(registry.for_room("terrace").len(), 1);
        conn.leave_room("terrace");
        assert!(registry.for_room("terrace").is_empty());
    }
}
