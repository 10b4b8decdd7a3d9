//! Health API
//!
//! 健康检查，顺带暴露在线人数统计。

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;
use crate::realtime::PresenceStats;
use crate::utils::{AppResponse, ok};

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/health", get(health))
}

#[derive(Debug, Serialize)]
struct HealthInfo {
    status: &'static str,
    environment: String,
    presence: PresenceStats,
}

async fn health(State(state): State<ServerState>) -> Json<AppResponse<HealthInfo>> {
    ok(HealthInfo {
        status: "ok",
        environment: state.config.environment.clone(),
        presence: state.router.presence().stats(),
    })
}
