//! Billing API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;

use shared::models::{Bill, PaymentMethod, Settlement};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{AppResponse, AppResult, ok};

/// GET /api/billing/:table_id - 账单预览
pub async fn bill(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path(table_id): Path<String>,
) -> AppResult<Json<AppResponse<Bill>>> {
    let bill = state.billing().bill(&table_id).await?;
    Ok(ok(bill))
}

#[derive(Debug, Deserialize)]
pub struct SettlePayload {
    pub method: PaymentMethod,
    #[serde(default)]
    pub amount_received: Option<Decimal>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// POST /api/billing/:table_id/settle - 结账
pub async fn settle(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(table_id): Path<String>,
    Json(payload): Json<SettlePayload>,
) -> AppResult<Json<AppResponse<Settlement>>> {
    let (settlement, events) = state
        .billing()
        .settle(
            &table_id,
            payload.method,
            payload.amount_received,
            payload.notes,
            &user,
        )
        .await?;
    state.publisher.publish_all(events);
    Ok(ok(settlement))
}
