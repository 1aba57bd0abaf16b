use async_trait::async_trait;
use redis::Script;
use redis::aio::ConnectionManager;
use std::sync::Arc;
use crate::core::error::AppError;

pub type DynRateLimiter = Arc<dyn RateLimiter + Send + Sync>;

/// 按 (动作, 客户端) 计数的限流器。超限返回 `AppError::RateLimitExceeded`。
#[async_trait]
pub trait RateLimiter {
    async fn check(
        &self,
        action_key: &str,
        client_key: &str,
        limit: usize,
        window: u64,
    ) -> Result<(), AppError>;
}

/// Redis 固定窗口限流，多个实例共享同一计数。
#[derive(Clone)]
pub struct RedisRateLimiter {
    manager: ConnectionManager,
}

impl RedisRateLimiter {
    pub fn new(manager: ConnectionManager) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn check(
        &self,
        action_key: &str,
        client_key: &str,
        limit: usize,
        window: u64,
    ) -> Result<(), AppError> {
        check_rate_limit(&self.manager, action_key, client_key, limit, window).await
    }
}

/// Lua 脚本实现固定窗口限流：窗口内第一次请求时设置过期时间。
async fn check_rate_limit(
    redis_manager: &ConnectionManager,
    action_key: &str,
    client_key: &str,
    limit: usize,
    window: u64,
) -> Result<(), AppError> {
    let redis_key = rate_limit_key(action_key, client_key);
    let mut conn = redis_manager.clone();

    // 原子操作：自增并设置过期时间（如果是第一次）
    let script = Script::new(r#"
        local count = redis.call("INCR", KEYS[1])
        if count == 1 then
            redis.call("EXPIRE", KEYS[1], ARGV[1])
        end
        return count
    "#);

    let count: usize = script
        .key(&redis_key)
        .arg(window)
        .invoke_async(&mut conn)
        .await?;

    if count > limit {
        tracing::warn!("⛔ Rate limit exceeded: {} on {} ({}/{})", client_key, action_key, count, limit);
        return Err(limit_exceeded(window));
    }

    Ok(())
}

pub fn limit_exceeded(window: u64) -> AppError {
    AppError::RateLimitExceeded(format!("Terlalu banyak permintaan. Coba lagi dalam {} detik.", window))
}

fn rate_limit_key(action_key: &str, client_key: &str) -> String {
    format!("rate_limit:{}:{}", action_key, client_key)
}
