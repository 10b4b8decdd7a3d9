//! Dining Table API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use shared::models::{DiningTable, DiningTableCreate, TableStatus};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{AppResponse, AppResult, ok};

/// GET /api/tables - 获取所有餐桌
pub async fn list(
    State(state): State<ServerState>,
    _user: CurrentUser,
) -> AppResult<Json<AppResponse<Vec<DiningTable>>>> {
    let tables = state.tables().list().await?;
    Ok(ok(tables))
}

/// GET /api/tables/:id - 获取单个餐桌
pub async fn get_by_id(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<DiningTable>>> {
    let table = state.tables().get(&id).await?;
    Ok(ok(table))
}

/// POST /api/tables - 创建餐桌
pub async fn create(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Json(payload): Json<DiningTableCreate>,
) -> AppResult<Json<AppResponse<DiningTable>>> {
    let table = state.tables().create(payload).await?;
    Ok(ok(table))
}

#[derive(Debug, Deserialize)]
pub struct SetStatusPayload {
    pub status: TableStatus,
}

/// PUT /api/tables/:id/status - 人工状态覆盖
pub async fn set_status(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<SetStatusPayload>,
) -> AppResult<Json<AppResponse<DiningTable>>> {
    let (table, events) = state.tables().set_status(&id, payload.status).await?;
    state.publisher.publish_all(events);
    Ok(ok(table))
}

/// DELETE /api/tables/:id - 删除餐桌 (软删除)
pub async fn delete(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<DiningTable>>> {
    let table = state.tables().delete(&id).await?;
    Ok(ok(table))
}
