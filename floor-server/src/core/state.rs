use std::sync::Arc;

use crate::auth::JwtService;
use crate::billing::BillingEngine;
use crate::core::Config;
use crate::db::repository::StaffRepository;
use crate::db::{MemoryStore, Store};
use crate::orders::OrderLifecycleManager;
use crate::realtime::{EventPublisher, RealtimeRouter};
use crate::tables::TableStateCoordinator;

/// 服务器状态 - 持有所有共享服务的引用
///
/// 使用 Arc 实现浅拷贝，handler 间传递成本极低。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | store | 文档存储适配器 |
/// | jwt | JWT 认证服务 |
/// | router | 实时广播路由器 (含在线注册表) |
/// | publisher | 领域事件发布器 |
///
/// 领域引擎不常驻：它们只是仓储引用的薄包装，每次通过访问器
/// 现场构造。
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 文档存储
    pub store: Arc<dyn Store>,
    /// JWT 认证服务
    pub jwt: Arc<JwtService>,
    /// 实时广播路由器
    pub router: Arc<RealtimeRouter>,
    /// 事件发布器
    pub publisher: EventPublisher,
}

impl ServerState {
    pub fn new(config: Config, store: Arc<dyn Store>) -> Self {
        let jwt = Arc::new(JwtService::with_config(config.jwt.clone()));
        let router = Arc::new(RealtimeRouter::new(
            Arc::clone(&jwt),
            StaffRepository::new(Arc::clone(&store)),
        ));
        let publisher = EventPublisher::new(Arc::clone(&router));

        Self {
            config,
            store,
            jwt,
            router,
            publisher,
        }
    }

    /// 初始化服务器状态 (内存存储)
    pub fn initialize(config: &Config) -> Self {
        Self::new(config.clone(), Arc::new(MemoryStore::new()))
    }

    pub fn orders(&self) -> OrderLifecycleManager {
        OrderLifecycleManager::new(Arc::clone(&self.store))
    }

    pub fn billing(&self) -> BillingEngine {
        BillingEngine::new(Arc::clone(&self.store))
    }

    pub fn tables(&self) -> TableStateCoordinator {
        TableStateCoordinator::new(Arc::clone(&self.store))
    }
}
