use config::{Config as ConfigLoader, ConfigError, Environment};
use dotenvy::dotenv;
use secrecy::SecretString;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Postgres 连接串（敏感信息）
    #[serde(alias = "DATABASE_URL")]
    pub database_url: SecretString,

    /// Redis 连接串（敏感信息），用于提交限流
    #[serde(alias = "REDIS_URL")]
    pub redis_url: SecretString,

    #[serde(default = "default_port", alias = "SERVER_PORT")]
    pub server_port: u16,

    #[serde(default = "default_host", alias = "SERVER_HOST")]
    pub server_host: String,

    #[serde(default = "default_log", alias = "RUST_LOG")]
    pub rust_log: String,

    /// 滚动日志文件所在目录
    #[serde(default = "default_log_dir", alias = "LOG_DIR")]
    pub log_dir: String,

    /// 诊所所在时区相对 UTC 的偏移（分钟），默认 WIB (UTC+7)。
    /// "今天" 以诊所本地日期为准。
    #[serde(default = "default_utc_offset", alias = "CLINIC_UTC_OFFSET_MINUTES")]
    pub clinic_utc_offset_minutes: i32,

    /// 成功通知的显示时长（毫秒），需要留出时间阅读排队号
    #[serde(default = "default_notify_success", alias = "NOTIFY_SUCCESS_MS")]
    pub notify_success_ms: u64,

    /// 错误通知的显示时长（毫秒）
    #[serde(default = "default_notify_error", alias = "NOTIFY_ERROR_MS")]
    pub notify_error_ms: u64,

    /// 预约会话空闲多久后被清理（秒）
    #[serde(default = "default_session_idle", alias = "SESSION_IDLE_SECS")]
    pub session_idle_secs: u64,

    #[serde(default = "default_submit_limit", alias = "SUBMIT_RATE_LIMIT")]
    pub submit_rate_limit: usize,

    #[serde(default = "default_submit_window", alias = "SUBMIT_RATE_WINDOW_SECS")]
    pub submit_rate_window_secs: u64,

    /// 启动时是否自动执行数据库迁移
    #[serde(default = "default_run_migrations", alias = "RUN_MIGRATIONS")]
    pub run_migrations: bool,
}

impl Config {
    /// 加载配置：
    /// - 支持 `.env`
    /// - 优先从环境变量加载
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_env(Environment::default())
    }

    /// 从指定的环境变量源构建配置。
    ///
    /// 注意：try_parsing(true) 会把 "3000" 解析成数字、"false" 解析成布尔值。
    pub fn from_env(source: Environment) -> Result<Self, ConfigError> {
        ConfigLoader::builder()
            .add_source(source.try_parsing(true))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
impl Config {
    /// 测试用配置：不连接任何外部服务，其余取默认值
    pub fn for_tests() -> Self {
        Self {
            database_url: "postgres://localhost/clinic".to_string().into(),
            redis_url: "redis://127.0.0.1/".to_string().into(),
            server_port: default_port(),
            server_host: "127.0.0.1".into(),
            rust_log: default_log(),
            log_dir: default_log_dir(),
            clinic_utc_offset_minutes: default_utc_offset(),
            notify_success_ms: default_notify_success(),
            notify_error_ms: default_notify_error(),
            session_idle_secs: default_session_idle(),
            submit_rate_limit: default_submit_limit(),
            submit_rate_window_secs: default_submit_window(),
            run_migrations: false,
        }
    }
}

// --- 默认值函数 ---
fn default_port() -> u16 {
    3000
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_log() -> String {
    "info".to_string()
}
fn default_log_dir() -> String {
    "logs".to_string()
}
fn default_utc_offset() -> i32 {
    7 * 60
}
fn default_notify_success() -> u64 {
    10_000
}
fn default_notify_error() -> u64 {
    5_000
}
fn default_session_idle() -> u64 {
    30 * 60
}
fn default_submit_limit() -> usize {
    5
}
fn default_submit_window() -> u64 {
    60
}
fn default_run_migrations() -> bool {
    true
}
