use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio::{runtime::Handle, time::sleep};

use crate::core::{constants::NOTIFICATION_FADE_MS, enums::NotificationKind};

/// 一条提示通知。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    /// 显示多久后开始淡出
    pub dismiss_after_ms: u64,
    /// 正在淡出，前端据此播放消失动画
    pub fading: bool,
    pub shown_at: DateTime<Utc>,
}

impl Notification {
    pub fn success(message: impl Into<String>, dismiss_after: Duration) -> Self {
        Self::new(NotificationKind::Success, message.into(), dismiss_after)
    }

    pub fn error(message: impl Into<String>, dismiss_after: Duration) -> Self {
        Self::new(NotificationKind::Error, message.into(), dismiss_after)
    }

    fn new(kind: NotificationKind, message: String, dismiss_after: Duration) -> Self {
        Self {
            kind,
            message,
            dismiss_after_ms: dismiss_after.as_millis() as u64,
            fading: false,
            shown_at: Utc::now(),
        }
    }
}

/// 通知面：显示一条新通知会替换掉之前的通知。
pub trait Notifier: Send + Sync {
    fn show(&self, notification: Notification);
}

pub type DynNotifier = Arc<dyn Notifier>;

/// 单槽位通知区。每次 `show` 递增代号，自动消失的定时任务只处理自己那一代，
/// 被替换掉的通知的定时器到点后什么也不做。
#[derive(Debug, Clone, Default)]
pub struct NotificationSlot {
    inner: Arc<SlotInner>,
}

#[derive(Debug, Default)]
struct SlotInner {
    current: Mutex<Option<(u64, Notification)>>,
    generation: AtomicU64,
}

impl SlotInner {
    fn start_fading(&self, generation: u64) -> bool {
        match self.current.lock().as_mut() {
            Some((g, n)) if *g == generation => {
                n.fading = true;
                true
            }
            _ => false,
        }
    }

    fn remove(&self, generation: u64) {
        let mut current = self.current.lock();
        if matches!(current.as_ref(), Some((g, _)) if *g == generation) {
            *current = None;
        }
    }
}

impl NotificationSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Notification> {
        self.inner.current.lock().as_ref().map(|(_, n)| n.clone())
    }
}

impl Notifier for NotificationSlot {
    fn show(&self, notification: Notification) {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let dismiss_after = Duration::from_millis(notification.dismiss_after_ms);
        tracing::debug!("🔔 Showing {} notice #{} for {:?}", notification.kind, generation, dismiss_after);
        *self.inner.current.lock() = Some((generation, notification));

        // 没有运行时（例如同步测试）时不安排自动消失
        let Ok(runtime) = Handle::try_current() else {
            return;
        };
        let inner = Arc::clone(&self.inner);
        runtime.spawn(async move {
            sleep(dismiss_after).await;
            if !inner.start_fading(generation) {
                return;
            }
            sleep(Duration::from_millis(NOTIFICATION_FADE_MS)).await;
            inner.remove(generation);
        });
    }
}
