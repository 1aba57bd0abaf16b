use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse},
};
use tracing::Level;

use crate::{handlers, state::AppState};

/// 创建应用程序路由器。
///
/// # 路由结构
/// - `/health` - 数据库连通性检查。
/// - `/api/booking/sessions` - 打开预约会话。
/// - `/api/booking/sessions/{id}` - 查询 / 关闭会话。
/// - `/api/booking/sessions/{id}/submit` - 提交预约表单（每个会话注册一次提交处理）。
pub fn create_router(state: AppState) -> Router {
    let booking_routes = Router::new()
        .route("/sessions", post(handlers::booking::open_session))
        .route(
            "/sessions/{id}",
            get(handlers::booking::get_session).delete(handlers::booking::close_session),
        )
        .route("/sessions/{id}/submit", post(handlers::booking::submit));

    Router::new()
        .route("/", get(|| async { "🏥 Clinic booking service is running!" }))
        .route("/health", get(handlers::health::health))
        .nest("/api/booking", booking_routes)
        // 全局日志与 CORS：预约页面可能部署在其他域名下
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO))
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
