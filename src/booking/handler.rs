use chrono::{FixedOffset, NaiveDate, Utc};
use serde::Serialize;
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    booking::{
        notify::{DynNotifier, Notification},
        store::{DynAppointmentStore, StoreError},
        surface::InputSurface,
        validate::{ValidationError, validate},
    },
    core::config::Config,
    dtos::appointment::{AppointmentForm, StoredAppointment},
};

/// 一次预约提交的失败原因。`Display` 即展示给用户的文案。
#[derive(Debug, Error)]
pub enum BookingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// 上一次提交仍在途中，本次提交被忽略
    #[error("Permintaan sebelumnya masih diproses")]
    Busy,

    /// 存储层拒绝写入，信息原样展示
    #[error("Gagal menyimpan data: {0}")]
    Remote(String),

    /// 无法连接存储层，具体原因只写日志
    #[error("Terjadi kesalahan koneksi ke database.")]
    Connection,
}

/// 预约成功的回执
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ack {
    pub message: String,
    pub reference: Uuid,
    pub queue_number: u64,
}

impl From<StoredAppointment> for Ack {
    fn from(stored: StoredAppointment) -> Self {
        let code = stored.id.simple().to_string()[..8].to_uppercase();
        let message = format!(
            "Janji berhasil dibuat!\nNomor antrian: {}\nKode referensi: {code}",
            stored.queue_number
        );
        Self {
            message,
            reference: stored.id,
            queue_number: stored.queue_number,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BookingSettings {
    pub success_ttl: Duration,
    pub error_ttl: Duration,
    /// 诊所本地时区，用来确定 "今天"
    pub utc_offset: FixedOffset,
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            success_ttl: Duration::from_secs(10),
            error_ttl: Duration::from_secs(5),
            utc_offset: FixedOffset::east_opt(7 * 3600).expect("valid offset"),
        }
    }
}

impl BookingSettings {
    pub fn from_config(config: &Config) -> Self {
        let fallback = Self::default();
        Self {
            success_ttl: Duration::from_millis(config.notify_success_ms),
            error_ttl: Duration::from_millis(config.notify_error_ms),
            utc_offset: config
                .clinic_utc_offset_minutes
                .checked_mul(60)
                .and_then(FixedOffset::east_opt)
                .unwrap_or(fallback.utc_offset),
        }
    }

    /// 诊所本地的今天
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.utc_offset).date_naive()
    }
}

/// 预约表单处理器。
///
/// 不变量：同一个 handler 同一时刻最多一次提交在途。`busy` 通过 compare-exchange 获取，
/// 由 `BusyGuard` 在所有退出路径（成功、失败、future 被丢弃）上释放，同时恢复输入面的可用状态。
pub struct BookingHandler {
    surface: Arc<dyn InputSurface>,
    notifier: DynNotifier,
    store: DynAppointmentStore,
    settings: BookingSettings,
    busy: AtomicBool,
}

struct BusyGuard<'a> {
    flag: &'a AtomicBool,
    surface: &'a dyn InputSurface,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.surface.set_busy(false);
        self.flag.store(false, Ordering::Release);
    }
}

impl BookingHandler {
    pub fn new(
        surface: Arc<dyn InputSurface>,
        notifier: DynNotifier,
        store: DynAppointmentStore,
        settings: BookingSettings,
    ) -> Self {
        Self {
            surface,
            notifier,
            store,
            settings,
            busy: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// 提交输入面上当前的表单内容。
    pub async fn submit(&self) -> Result<Ack, BookingError> {
        let _busy = self.acquire()?;
        self.run().await
    }

    /// 先把字段写入输入面再提交。写入发生在占用 busy 之后，
    /// 不会覆盖一次在途提交正在使用的表单。
    pub async fn submit_entry(&self, fields: AppointmentForm) -> Result<Ack, BookingError> {
        let _busy = self.acquire()?;
        self.surface.fill(fields);
        self.run().await
    }

    fn acquire(&self) -> Result<BusyGuard<'_>, BookingError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| BookingError::Busy)?;
        self.surface.set_busy(true);
        Ok(BusyGuard {
            flag: &self.busy,
            surface: self.surface.as_ref(),
        })
    }

    async fn run(&self) -> Result<Ack, BookingError> {
        let fields = self.surface.read();

        // 第一步：校验。失败时不访问存储层。
        let request = validate(&fields, self.settings.today())
            .inspect_err(|e| self.show_error(e.to_string()))?;

        // 第二步：插入一条记录，只尝试一次。
        match self.store.insert(&request).await {
            Ok(stored) => {
                let ack = Ack::from(stored);
                tracing::info!(
                    "✅ Appointment booked: ref={} date={} queue={}",
                    ack.reference, request.date, ack.queue_number
                );
                self.surface.reset();
                self.notifier
                    .show(Notification::success(ack.message.clone(), self.settings.success_ttl));
                Ok(ack)
            }
            Err(StoreError::Rejected(message)) => {
                tracing::warn!("⚠️ Appointment rejected by store: {}", message);
                let err = BookingError::Remote(message);
                self.show_error(err.to_string());
                Err(err)
            }
            Err(StoreError::Unreachable(cause)) => {
                tracing::error!("❌ Appointment store unreachable: {}", cause);
                let err = BookingError::Connection;
                self.show_error(err.to_string());
                Err(err)
            }
        }
    }

    fn show_error(&self, message: String) {
        self.notifier.show(Notification::error(message, self.settings.error_ttl));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        booking::{
            notify::NotificationSlot,
            store::AppointmentStore,
            surface::FormState,
        },
        core::enums::NotificationKind,
        dtos::appointment::AppointmentRequest,
    };
    use async_trait::async_trait;
    use chrono::Days;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    enum Outcome {
        Stored(u64),
        Rejected(&'static str),
        Unreachable,
        Hang,
    }

    struct ScriptedStore {
        outcome: Outcome,
        calls: AtomicUsize,
        entered: Notify,
        release: Notify,
        gated: bool,
    }

    impl ScriptedStore {
        fn new(outcome: Outcome) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                calls: AtomicUsize::new(0),
                entered: Notify::new(),
                release: Notify::new(),
                gated: false,
            })
        }

        fn gated(outcome: Outcome) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                calls: AtomicUsize::new(0),
                entered: Notify::new(),
                release: Notify::new(),
                gated: true,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AppointmentStore for ScriptedStore {
        async fn insert(&self, _record: &AppointmentRequest) -> Result<StoredAppointment, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.gated {
                self.entered.notify_one();
                self.release.notified().await;
            }
            match self.outcome {
                Outcome::Stored(queue_number) => Ok(StoredAppointment {
                    id: Uuid::new_v4(),
                    queue_number,
                }),
                Outcome::Rejected(message) => Err(StoreError::Rejected(message.to_string())),
                Outcome::Unreachable => Err(StoreError::Unreachable("connection refused".into())),
                Outcome::Hang => std::future::pending().await,
            }
        }
    }

    struct Fixture {
        handler: Arc<BookingHandler>,
        form: Arc<FormState>,
        slot: NotificationSlot,
    }

    fn fixture(store: Arc<ScriptedStore>) -> Fixture {
        let form = Arc::new(FormState::new());
        let slot = NotificationSlot::new();
        let handler = Arc::new(BookingHandler::new(
            form.clone(),
            Arc::new(slot.clone()),
            store,
            BookingSettings::default(),
        ));
        Fixture { handler, form, slot }
    }

    fn valid_form() -> AppointmentForm {
        let tomorrow = BookingSettings::default().today() + Days::new(1);
        AppointmentForm {
            name: "Siti Rahma".into(),
            email: "siti@example.com".into(),
            phone: "0812-3456-789".into(),
            service: "gigi".into(),
            doctor: "dr. Budi".into(),
            date: tomorrow.to_string(),
            time: "10:00".into(),
            message: "".into(),
        }
    }

    #[tokio::test]
    async fn missing_fields_never_reach_the_store() {
        let store = ScriptedStore::new(Outcome::Stored(1));
        let fx = fixture(store.clone());
        let mut form = valid_form();
        form.phone = "".into();

        let err = fx.handler.submit_entry(form.clone()).await.unwrap_err();

        assert!(matches!(err, BookingError::Validation(ValidationError::MissingFields)));
        assert_eq!(store.calls(), 0);
        assert_eq!(fx.form.read(), form);
        let notice = fx.slot.current().unwrap();
        assert_eq!(notice.kind, NotificationKind::Error);
        assert_eq!(notice.message, "Mohon lengkapi semua field yang wajib diisi (*)");
        assert!(!fx.handler.is_busy());
    }

    #[tokio::test]
    async fn success_acknowledges_and_clears_the_form() {
        let store = ScriptedStore::new(Outcome::Stored(4));
        let fx = fixture(store.clone());

        let ack = fx.handler.submit_entry(valid_form()).await.unwrap();

        assert_eq!(ack.queue_number, 4);
        assert!(ack.message.starts_with("Janji berhasil dibuat!"));
        assert!(ack.message.contains("Nomor antrian: 4"));
        assert_eq!(store.calls(), 1);
        assert_eq!(fx.form.read(), AppointmentForm::default());

        let notice = fx.slot.current().unwrap();
        assert_eq!(notice.kind, NotificationKind::Success);
        assert_eq!(notice.dismiss_after_ms, 10_000);
        assert!(!fx.form.is_busy());
    }

    #[tokio::test]
    async fn rejection_surfaces_store_message_and_keeps_the_form() {
        let store = ScriptedStore::new(Outcome::Rejected("duplicate"));
        let fx = fixture(store.clone());
        let form = valid_form();

        let err = fx.handler.submit_entry(form.clone()).await.unwrap_err();

        assert!(matches!(&err, BookingError::Remote(m) if m == "duplicate"));
        assert_eq!(fx.form.read(), form);
        let notice = fx.slot.current().unwrap();
        assert_eq!(notice.message, "Gagal menyimpan data: duplicate");
        assert_eq!(notice.dismiss_after_ms, 5_000);
        assert!(!fx.handler.is_busy());
    }

    #[tokio::test]
    async fn unreachable_store_reports_generic_connection_error() {
        let store = ScriptedStore::new(Outcome::Unreachable);
        let fx = fixture(store.clone());

        let err = fx.handler.submit_entry(valid_form()).await.unwrap_err();

        assert!(matches!(err, BookingError::Connection));
        let notice = fx.slot.current().unwrap();
        assert_eq!(notice.message, "Terjadi kesalahan koneksi ke database.");
        assert!(!notice.message.contains("refused"));
        assert!(!fx.handler.is_busy());
        assert!(!fx.form.is_busy());
    }

    #[tokio::test]
    async fn ack_carries_short_reference_code() {
        let store = ScriptedStore::new(Outcome::Stored(2));
        let fx = fixture(store);

        let ack = fx.handler.submit_entry(valid_form()).await.unwrap();

        let code = ack.reference.simple().to_string()[..8].to_uppercase();
        assert!(ack.message.ends_with(&format!("Kode referensi: {code}")));
    }

    #[tokio::test]
    async fn submit_reads_what_is_already_on_the_surface() {
        let store = ScriptedStore::new(Outcome::Stored(1));
        let fx = fixture(store.clone());
        fx.form.fill(valid_form());

        assert!(fx.handler.submit().await.is_ok());
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn second_submission_while_in_flight_is_refused() {
        let store = ScriptedStore::gated(Outcome::Stored(1));
        let fx = fixture(store.clone());

        let handler = fx.handler.clone();
        let first = tokio::spawn(async move { handler.submit_entry(valid_form()).await });

        store.entered.notified().await;
        assert!(fx.handler.is_busy());
        assert!(fx.form.is_busy());

        let second = fx.handler.submit_entry(valid_form()).await;
        assert!(matches!(second, Err(BookingError::Busy)));
        assert_eq!(store.calls(), 1);

        store.release.notify_one();
        assert!(first.await.unwrap().is_ok());
        assert!(!fx.handler.is_busy());
        assert!(!fx.form.is_busy());
    }

    #[tokio::test]
    async fn dropping_an_in_flight_submission_releases_busy() {
        let store = ScriptedStore::new(Outcome::Hang);
        let fx = fixture(store.clone());

        let result = tokio::time::timeout(
            Duration::from_millis(20),
            fx.handler.submit_entry(valid_form()),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(store.calls(), 1);
        assert!(!fx.handler.is_busy());
        assert!(!fx.form.is_busy());
    }

    fn config(offset_minutes: i32) -> Config {
        Config {
            clinic_utc_offset_minutes: offset_minutes,
            notify_success_ms: 8_000,
            notify_error_ms: 3_000,
            ..Config::for_tests()
        }
    }

    #[test]
    fn settings_follow_config() {
        let settings = BookingSettings::from_config(&config(0));
        assert_eq!(settings.utc_offset, FixedOffset::east_opt(0).unwrap());
        assert_eq!(settings.success_ttl, Duration::from_secs(8));
        assert_eq!(settings.error_ttl, Duration::from_secs(3));
    }

    #[test]
    fn out_of_range_offset_falls_back_to_clinic_default() {
        let settings = BookingSettings::from_config(&config(100_000));
        assert_eq!(settings.utc_offset, BookingSettings::default().utc_offset);
    }

    #[test]
    fn overflowing_offset_falls_back_instead_of_panicking() {
        for minutes in [i32::MAX, i32::MIN, i32::MAX / 60 + 1] {
            let settings = BookingSettings::from_config(&config(minutes));
            assert_eq!(settings.utc_offset, BookingSettings::default().utc_offset);
        }
    }

    #[test]
    fn negative_offset_is_honoured() {
        let settings = BookingSettings::from_config(&config(-300));
        assert_eq!(settings.utc_offset, FixedOffset::west_opt(5 * 3600).unwrap());
    }
}
