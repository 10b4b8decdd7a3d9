//! Floor Server - 餐厅楼面协调服务
//!
//! # 架构概述
//!
//! 单店楼面运营的协调核心，提供以下功能：
//!
//! - **订单生命周期** (`orders`): 开单、加菜、状态机转换、取消
//! - **账单与结算** (`billing`): 跨订单账单投影、一次性结账
//! - **餐桌管理** (`tables`): 建桌、删桌、人工状态覆盖
//! - **实时广播** (`realtime`): 在线注册表与按角色/个人的事件路由
//! - **认证** (`auth`): JWT 校验与 CurrentUser 提取
//! - **HTTP API** (`api`): RESTful 接口
//!
//! # 模块结构
//!
//! ```text
//! floor-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 存储适配层与仓储
//! ├── orders/        # 订单生命周期引擎
//! ├── billing/       # 账单与结算引擎
//! ├── tables/        # 餐桌协调器
//! ├── realtime/      # 广播路由与在线注册表
//! └── utils/         # 错误、日志
//! ```

pub mod api;
pub mod auth;
pub mod billing;
pub mod core;
pub mod db;
pub mod orders;
pub mod realtime;
pub mod tables;
pub mod utils;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use billing::BillingEngine;
pub use core::{Config, Server, ServerState};
pub use orders::OrderLifecycleManager;
pub use realtime::{EventPublisher, PresenceRegistry, RealtimeRouter};
pub use tables::TableStateCoordinator;
pub use utils::{AppError, AppResponse, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
