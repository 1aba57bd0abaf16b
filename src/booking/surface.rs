use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::dtos::appointment::AppointmentForm;

/// 表单输入面：handler 从这里读取字段，成功后清空，提交期间把提交控件置为不可用。
pub trait InputSurface: Send + Sync {
    fn read(&self) -> AppointmentForm;
    fn fill(&self, fields: AppointmentForm);
    fn reset(&self);
    fn set_busy(&self, busy: bool);
    fn is_busy(&self) -> bool;
}

/// 内存中的表单状态，每个预约会话一份。
#[derive(Debug, Default)]
pub struct FormState {
    fields: Mutex<AppointmentForm>,
    busy: AtomicBool,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InputSurface for FormState {
    fn read(&self) -> AppointmentForm {
        self.fields.lock().clone()
    }

    fn fill(&self, fields: AppointmentForm) {
        *self.fields.lock() = fields;
    }

    fn reset(&self) {
        *self.fields.lock() = AppointmentForm::default();
    }

    fn set_busy(&self, busy: bool) {
        self.busy.store(busy, Ordering::SeqCst);
    }

    fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }
}
