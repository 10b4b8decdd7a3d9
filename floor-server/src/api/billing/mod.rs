//! Billing API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/billing", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/{table_id}", get(handler::bill))
        .route("/{table_id}/settle", post(handler::settle))
}
