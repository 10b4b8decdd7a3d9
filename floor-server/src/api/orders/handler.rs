//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use shared::models::{Order, OrderLine, OrderLineInput, OrderStatus};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::OrderRepository;
use crate::utils::{AppError, AppResponse, AppResult, ok};

#[derive(Debug, Deserialize)]
pub struct CreateOrderPayload {
    pub table_id: String,
    pub lines: Vec<OrderLineInput>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// POST /api/orders - 开单
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CreateOrderPayload>,
) -> AppResult<Json<AppResponse<Order>>> {
    let (order, events) = state
        .orders()
        .create(&payload.table_id, &user, payload.lines, payload.notes)
        .await?;
    state.publisher.publish_all(events);
    Ok(ok(order))
}

#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

/// GET /api/orders/:id - 订单详情 (含订单行)
pub async fn get_by_id(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<OrderDetail>>> {
    let repo = OrderRepository::new(state.store.clone());
    let order = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))?;
    let lines = repo.lines_for_order(&id).await?;
    Ok(ok(OrderDetail { order, lines }))
}

#[derive(Debug, Deserialize)]
pub struct AppendLinesPayload {
    pub lines: Vec<OrderLineInput>,
}

/// POST /api/orders/:id/lines - 加菜
pub async fn append_lines(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<AppendLinesPayload>,
) -> AppResult<Json<AppResponse<Order>>> {
    let (order, events) = state.orders().append_lines(&id, payload.lines).await?;
    state.publisher.publish_all(events);
    Ok(ok(order))
}

#[derive(Debug, Deserialize)]
pub struct TransitionPayload {
    pub status: OrderStatus,
    #[serde(default)]
    pub reason: Option<String>,
}

/// POST /api/orders/:id/transition - 状态转换
pub async fn transition(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<TransitionPayload>,
) -> AppResult<Json<AppResponse<Order>>> {
    let (order, events) = state
        .orders()
        .transition(&id, payload.status, payload.reason)
        .await?;
    state.publisher.publish_all(events);
    Ok(ok(order))
}

#[derive(Debug, Deserialize)]
pub struct CancelPayload {
    pub reason: String,
}

/// POST /api/orders/:id/cancel - 取消订单
pub async fn cancel(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<CancelPayload>,
) -> AppResult<Json<AppResponse<Order>>> {
    let (order, events) = state.orders().cancel(&id, payload.reason).await?;
    state.publisher.publish_all(events);
    Ok(ok(order))
}
