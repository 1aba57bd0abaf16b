use sea_orm::DatabaseConnection;
use std::sync::Arc;
use crate::{booking::SessionRegistry, core::config::Config, utils::limiter::DynRateLimiter};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    /// 按客户端 IP 限流，生产环境由 Redis 计数
    pub limiter: DynRateLimiter,
    /// 全局配置，使用 Arc 包装以实现廉价克隆
    pub config: Arc<Config>,
    /// 所有打开的预约会话
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        limiter: DynRateLimiter,
        config: Config,
        sessions: Arc<SessionRegistry>,
    ) -> Self {
        Self {
            db,
            limiter,
            config: Arc::new(config),
            sessions,
        }
    }
}
