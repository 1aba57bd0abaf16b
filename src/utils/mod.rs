pub mod limiter;

/// 限流宏：提供便捷的速率限制检查功能，防止预约表单被刷。
/// 用法: rate_limit!(state.limiter, "action_name", &client_key, max_count, window_seconds);
#[macro_export]
macro_rules! rate_limit {
    ($limiter:expr, $action:expr, $key:expr, $limit:expr, $window:expr) => {
        if let Err(e) = $crate::utils::limiter::RateLimiter::check(&*$limiter, $action, $key, $limit, $window).await {
            return Err(e.into());
        }
    };
}
