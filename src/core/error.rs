// src/core/error.rs
use axum::{http::StatusCode, response::{IntoResponse, Response}};
use thiserror::Error;
use crate::{booking::BookingError, dtos::response::Res};

/// 应用程序统一错误类型。覆盖数据库、Redis、会话查找、限流等基础设施层面的错误。
///
/// 预约提交本身的结果（校验失败、远端拒绝、连接失败）由 `BookingError` 表达，
/// 通过 `booking_status` 映射到 HTTP 状态码，并随会话视图一起返回。
#[derive(Error, Debug)]
pub enum AppError {
    /// 数据库相关错误。包装 SeaORM 的 `DbErr`，自动转换。
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    /// Redis 相关错误。包装 redis crate 的 `RedisError`，自动转换。
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    /// 资源未找到错误。如预约会话不存在或已过期。返回404 Not Found。
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// 请求频率限制错误。返回429 Too Many Requests。
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// 服务器内部错误。用于未预期的错误情况。返回500 Internal Server Error。
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // 对于内部错误（如数据库、Redis），返回通用的错误消息，避免泄露敏感信息。
        let (status, msg) = match &self {
            AppError::DatabaseError(e) => {
                tracing::error!("❌ Database Error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database service error".to_string())
            },
            AppError::RedisError(e) => {
                tracing::error!("❌ Redis Error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Cache service error".to_string())
            },
            AppError::InternalServerError(msg) => {
                tracing::error!("❌ Internal Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            },
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::RateLimitExceeded(msg) => (StatusCode::TOO_MANY_REQUESTS, msg.clone()),
        };

        Res::<()>::with_error(status, &msg).into_response()
    }
}

/// 预约提交结果到 HTTP 状态码的映射。
pub fn booking_status(err: &BookingError) -> StatusCode {
    match err {
        BookingError::Validation(_) => StatusCode::BAD_REQUEST,
        BookingError::Busy => StatusCode::CONFLICT,
        BookingError::Remote(_) => StatusCode::UNPROCESSABLE_ENTITY,
        BookingError::Connection => StatusCode::SERVICE_UNAVAILABLE,
    }
}
