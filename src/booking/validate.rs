use chrono::NaiveDate;
use thiserror::Error;
use validator::Validate;

use crate::dtos::{
    EMAIL_REGEX, PHONE_REGEX, PHONE_SEPARATORS,
    appointment::{AppointmentForm, AppointmentRequest},
};

/// 表单校验错误。`Display` 即展示给用户的文案。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Mohon lengkapi semua field yang wajib diisi (*)")]
    MissingFields,

    #[error("Format email tidak valid")]
    InvalidEmail,

    #[error("Format nomor telepon tidak valid")]
    InvalidPhone,

    #[error("Format tanggal tidak valid")]
    InvalidDate,

    #[error("Tanggal tidak boleh di masa lalu")]
    PastDate,

    #[error("Isian {field} terlalu panjang")]
    TooLong { field: String },
}

/// 校验原始表单并构造 `AppointmentRequest`。
///
/// 按固定顺序检查，只返回第一个失败项：
/// 必填项 → 邮箱 → 手机号 → 日期格式 → 日期不早于今天 → 长度上限。
/// 纯函数：同样的输入与 `today` 总是得到同样的结果。
pub fn validate(form: &AppointmentForm, today: NaiveDate) -> Result<AppointmentRequest, ValidationError> {
    let name = form.name.trim();
    let email = form.email.trim();
    let phone = form.phone.trim();
    let service = form.service.trim();
    let date = form.date.trim();
    let time = form.time.trim();

    if [name, email, phone, service, date, time].iter().any(|v| v.is_empty()) {
        return Err(ValidationError::MissingFields);
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }

    if !PHONE_REGEX.is_match(&PHONE_SEPARATORS.replace_all(phone, "")) {
        return Err(ValidationError::InvalidPhone);
    }

    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate)?;
    if date < today {
        return Err(ValidationError::PastDate);
    }

    let request = AppointmentRequest {
        name: name.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        service: service.to_string(),
        doctor: optional(&form.doctor),
        date,
        time: time.to_string(),
        message: optional(&form.message),
    };

    request.validate().map_err(|errors| ValidationError::TooLong {
        field: errors
            .field_errors()
            .into_keys()
            .min()
            .map(|k| k.to_string())
            .unwrap_or_default(),
    })?;

    Ok(request)
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
