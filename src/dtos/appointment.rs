// src/dtos/appointment.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 预约表单的原始输入。字段缺失时按空字符串处理，与浏览器表单提交一致。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppointmentForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service: String,
    pub doctor: String,
    pub date: String,
    pub time: String,
    pub message: String,
}

/// 通过校验的预约请求，只有这个类型会被交给存储层。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
pub struct AppointmentRequest {
    #[validate(length(max = 100))]
    pub name: String,
    #[validate(length(max = 254))]
    pub email: String,
    /// 用户输入的原样号码（已去掉首尾空白）
    #[validate(length(max = 32))]
    pub phone: String,
    #[validate(length(max = 100))]
    pub service: String,
    #[validate(length(max = 100))]
    pub doctor: Option<String>,
    pub date: NaiveDate,
    #[validate(length(max = 32))]
    pub time: String,
    #[validate(length(max = 2000))]
    pub message: Option<String>,
}

/// 存储成功后的回执
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredAppointment {
    pub id: uuid::Uuid,
    /// 当日排队号（含本条记录），与插入在同一事务内统计
    pub queue_number: u64,
}
