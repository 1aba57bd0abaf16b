use chrono::NaiveDate;
use parking_lot::{Mutex, RwLock};
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use uuid::Uuid;

use crate::{
    booking::{
        handler::{Ack, BookingError, BookingHandler, BookingSettings},
        notify::NotificationSlot,
        store::DynAppointmentStore,
        surface::{FormState, InputSurface},
    },
    dtos::{appointment::AppointmentForm, booking::SessionView},
};

/// 一个访客的预约会话：一份表单、一个通知槽、一个 handler。
pub struct BookingSession {
    pub id: Uuid,
    /// 打开会话时确定的日期下限
    pub min_date: NaiveDate,
    form: Arc<FormState>,
    notices: NotificationSlot,
    handler: BookingHandler,
    last_seen: Mutex<Instant>,
}

impl BookingSession {
    pub fn open(store: DynAppointmentStore, settings: BookingSettings) -> Self {
        let form = Arc::new(FormState::new());
        let notices = NotificationSlot::new();
        let min_date = settings.today();
        let handler = BookingHandler::new(form.clone(), Arc::new(notices.clone()), store, settings);

        Self {
            id: Uuid::new_v4(),
            min_date,
            form,
            notices,
            handler,
            last_seen: Mutex::new(Instant::now()),
        }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id,
            min_date: self.min_date,
            busy: self.form.is_busy(),
            form: self.form.read(),
            notification: self.notices.current(),
        }
    }

    pub async fn submit(&self, fields: AppointmentForm) -> Result<Ack, BookingError> {
        self.touch();
        self.handler.submit_entry(fields).await
    }

    pub fn is_busy(&self) -> bool {
        self.handler.is_busy()
    }

    fn touch(&self) {
        *self.last_seen.lock() = Instant::now();
    }

    fn idle_for(&self) -> Duration {
        self.last_seen.lock().elapsed()
    }
}

/// 内存中的会话表。会话之间互不共享状态，只共享存储层。
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Arc<BookingSession>>>,
    store: DynAppointmentStore,
    settings: BookingSettings,
    idle_ttl: Duration,
}

impl SessionRegistry {
    pub fn new(store: DynAppointmentStore, settings: BookingSettings, idle_ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            store,
            settings,
            idle_ttl,
        }
    }

    pub fn open(&self) -> Arc<BookingSession> {
        let session = Arc::new(BookingSession::open(self.store.clone(), self.settings.clone()));
        self.sessions.write().insert(session.id, session.clone());
        tracing::debug!("🆕 Booking session opened: {}", session.id);
        session
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<BookingSession>> {
        let session = self.sessions.read().get(id).cloned()?;
        session.touch();
        Some(session)
    }

    pub fn close(&self, id: &Uuid) -> bool {
        self.sessions.write().remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// 清理空闲超时的会话，提交在途的会话保留。返回清理的数量。
    pub fn sweep(&self) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, s| s.is_busy() || s.idle_for() < self.idle_ttl);
        before - sessions.len()
    }

    /// 后台清理任务，按固定间隔执行 `sweep`。
    pub async fn run_sweeper(self: Arc<Self>, every: Duration) {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let removed = self.sweep();
            if removed > 0 {
                tracing::info!("🧹 Swept {} idle booking sessions ({} left)", removed, self.len());
            }
        }
    }
}
