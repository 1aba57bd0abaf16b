// ==========================================
// 持久化：预约记录所在的表名。
// ==========================================

/// 预约表名：实体、迁移与存储层共用。
pub const APPOINTMENTS_TABLE: &str = "appointments";

// ==========================================
// 通知：淡出动画时长，淡出结束后通知从槽位中移除。
// ==========================================

pub const NOTIFICATION_FADE_MS: u64 = 300;

// ==========================================
// 会话：清理任务的执行间隔（秒）。
// ==========================================

pub const SESSION_SWEEP_INTERVAL: u64 = 60;

// ==========================================
// 限流：打开预约会话的频率（每个 IP）。提交的限流在配置中设置。
// ==========================================

pub const OPEN_SESSION_LIMIT: usize = 30;
pub const OPEN_SESSION_WINDOW: u64 = 60;
