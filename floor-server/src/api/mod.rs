//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查与在线统计
//! - [`tables`] - 餐桌管理接口
//! - [`orders`] - 订单生命周期接口
//! - [`billing`] - 账单与结算接口
//!
//! Handler 的职责是薄的：解析请求、调用领域引擎、发布返回的事件、
//! 用统一响应结构返回负载。

pub mod billing;
pub mod health;
pub mod orders;
pub mod tables;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

pub use crate::utils::{AppResponse, AppResult};

pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(tables::router())
        .merge(orders::router())
        .merge(billing::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
