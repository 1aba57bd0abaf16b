// src/dtos/booking.rs
use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    booking::{Ack, Notification},
    dtos::appointment::AppointmentForm,
};

/// 预约会话的当前状态：表单内容、提交按钮是否禁用、当前通知。
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    /// 日期选择器的下限（诊所本地的今天）
    pub min_date: NaiveDate,
    pub busy: bool,
    pub form: AppointmentForm,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
}

/// 提交结果：成功时带回执，失败时只有会话视图（表单保留原值）。
#[derive(Debug, Serialize)]
pub struct SubmitView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ack: Option<Ack>,
    pub session: SessionView,
}
