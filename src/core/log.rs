use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, registry, util::SubscriberInitExt, EnvFilter,
};

use crate::core::config::Config;

/// 数据库驱动的日志很吵，除非 RUST_LOG 里单独指定，否则只看 warn 以上
const QUIET_TARGETS: [&str; 3] = ["sqlx", "sea_orm", "sea_orm_migration"];

/// 初始化日志：控制台 + `config.log_dir` 下按天滚动的 `clinic-booking.log`。
/// 返回的 guard 必须存活到进程结束。
pub fn init(config: &Config) -> WorkerGuard {
    // 1. 文件输出层：按天轮询
    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "clinic-booking.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(non_blocking)
        .with_file(true)        // ✅ 显示文件名
        .with_line_number(true) // ✅ 显示行号
        .with_thread_ids(true)  // 同一会话的并发提交靠线程ID区分
        .with_target(false);

    // 2. 控制台层：带颜色
    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_file(true)
        .with_line_number(true);

    // 3. 过滤器：RUST_LOG 写错时退回 info，而不是静默丢掉所有日志
    let directives = filter_directives(&config.rust_log);
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|e| {
        eprintln!("⚠️ Invalid RUST_LOG {:?} ({}), falling back to info", config.rust_log, e);
        EnvFilter::new(filter_directives("info"))
    });

    registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    guard
}

/// 在用户给出的级别后面追加驱动降噪规则；用户已经为某个驱动写了规则时不覆盖。
fn filter_directives(level: &str) -> String {
    let mut directives = level.trim().to_string();
    for target in QUIET_TARGETS {
        let mentioned = directives
            .split(',')
            .any(|d| d.trim().split('=').next() == Some(target));
        if !mentioned {
            if !directives.is_empty() {
                directives.push(',');
            }
            directives.push_str(target);
            directives.push_str("=warn");
        }
    }
    directives
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_drivers_are_quieted_by_default() {
        assert_eq!(
            filter_directives("info"),
            "info,sqlx=warn,sea_orm=warn,sea_orm_migration=warn"
        );
    }

    #[test]
    fn explicit_driver_level_is_kept() {
        let directives = filter_directives("debug,sqlx=debug");
        assert!(directives.starts_with("debug,sqlx=debug"));
        assert_eq!(directives.matches("sqlx=").count(), 1);
        assert!(directives.contains("sea_orm=warn"));
    }

    #[test]
    fn empty_level_yields_only_driver_rules() {
        assert_eq!(
            filter_directives(" "),
            "sqlx=warn,sea_orm=warn,sea_orm_migration=warn"
        );
    }

    #[test]
    fn combined_directives_parse() {
        assert!(EnvFilter::try_new(filter_directives("clinic_booking=debug,info")).is_ok());
    }
}
