// src/start.rs
use std::{net::SocketAddr, sync::Arc, time::Duration};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, ConnectOptions};
use secrecy::ExposeSecret;
use tokio::net::TcpListener;
use tokio::signal;

use crate::{
    booking::{BookingSettings, SessionRegistry},
    core::{config::Config, constants::SESSION_SWEEP_INTERVAL, log},
    routes,
    services::appointment_store::SeaOrmAppointmentStore,
    state::AppState,
    utils::limiter::RedisRateLimiter,
};

/// 启动并运行应用程序。
///
/// 1. 加载配置、初始化日志
/// 2. 连接数据库（按需执行迁移）与 Redis
/// 3. 组装存储层与会话表，启动会话清理任务
/// 4. 启动 HTTP 服务器，监听系统信号以实现优雅关闭
pub async fn run() {
    let config = Config::new().expect("❌ Failed to load configuration");

    // guard 必须存活到进程结束，否则文件日志会丢失
    let _guard = log::init(&config);
    tracing::info!("🔍 Config loaded successfully.");

    let mut opt = ConnectOptions::new(config.database_url.expose_secret());
    opt.max_connections(20)
        .min_connections(2)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    let db = Database::connect(opt)
        .await
        .expect("❌ Failed to connect to Database");
    tracing::info!("✅ Database connected.");

    if config.run_migrations {
        Migrator::up(&db, None)
            .await
            .expect("❌ Failed to run migrations");
        tracing::info!("✅ Migrations applied.");
    }

    let client = redis::Client::open(config.redis_url.expose_secret())
        .expect("❌ Invalid Redis URL");
    let redis_manager = client.get_connection_manager()
        .await
        .expect("❌ Failed to connect to Redis");
    tracing::info!("✅ Redis connected.");

    // 存储层与会话表：每个会话拥有自己的表单、通知槽与 handler，共享同一个存储层
    let store = Arc::new(SeaOrmAppointmentStore::new(db.clone()));
    let sessions = Arc::new(SessionRegistry::new(
        store,
        BookingSettings::from_config(&config),
        Duration::from_secs(config.session_idle_secs),
    ));
    tokio::spawn(sessions.clone().run_sweeper(Duration::from_secs(SESSION_SWEEP_INTERVAL)));

    let limiter = Arc::new(RedisRateLimiter::new(redis_manager));
    let state = AppState::new(db, limiter, config.clone(), sessions);

    let addr_str = format!("{}:{}", config.server_host, config.server_port);
    let addr: SocketAddr = addr_str.parse().expect("❌ Invalid address configuration");

    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = TcpListener::bind(addr).await.expect("❌ Failed to bind address");
    let app = routes::create_router(state);

    // 限流按客户端 IP 计数，需要连接信息
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("❌ Server error");
}

/// 监听系统关闭信号：Ctrl+C（SIGINT）或 SIGTERM。
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("🛑 Signal received, starting graceful shutdown...");
}
