//! 消息总线消息体
//!
//! 服务器和客户端之间的统一消息信封。载荷是 JSON，事件名是点分
//! 字符串 (如 `order.created`)，与领域事件目录一一对应。

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::util::now_millis;

/// One message on the wire (server → client or client → server)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusMessage {
    pub request_id: Uuid,
    /// Dotted event name, e.g. `order.created`, `room.join`, `ping`
    pub event: String,
    pub payload: Value,
    /// Sender timestamp, milliseconds since epoch
    pub ts: i64,
}

impl BusMessage {
    pub fn new(event: impl Into<String>, payload: Value) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            event: event.into(),
            payload,
            ts: now_millis(),
        }
    }

    /// Heartbeat reply
    pub fn pong() -> Self {
        Self::new("pong", json!({}))
    }

    /// Parse the payload into a concrete type
    pub fn parse_payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }

    /// Serialize for a byte-oriented transport
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Parse from a byte-oriented transport
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
