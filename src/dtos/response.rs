use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// 统一响应格式：`{ code, msg, data }`。`code` 同时作为 HTTP 状态码。
///
/// 预约提交失败时依然带 `data`（会话视图），前端据此保留表单并显示通知。
#[derive(Debug, Serialize)]
pub struct Res<T> {
    pub code: u16,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Res<T>
where
    T: Serialize,
{
    pub fn with_data(data: T) -> Self {
        Self::with_code(StatusCode::OK, "success", Some(data))
    }

    /// 201：新建了会话或预约
    pub fn created(msg: &str, data: T) -> Self {
        Self::with_code(StatusCode::CREATED, msg, Some(data))
    }

    pub fn with_code(code: StatusCode, msg: &str, data: Option<T>) -> Self {
        Self {
            code: code.as_u16(),
            msg: msg.to_string(),
            data,
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl Res<()> {
    pub fn with_msg(msg: &str) -> Self {
        Self::with_code(StatusCode::OK, msg, None)
    }

    pub fn with_error(code: StatusCode, msg: &str) -> Self {
        Self::with_code(code, msg, None)
    }
}

impl<T> IntoResponse for Res<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_data_is_omitted() {
        let body = serde_json::to_value(Res::<()>::with_error(StatusCode::NOT_FOUND, "missing")).unwrap();
        assert_eq!(body, json!({ "code": 404, "msg": "missing" }));
    }

    #[test]
    fn created_carries_data_and_status() {
        let res = Res::created("Session opened", json!({ "busy": false }));
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(serde_json::to_value(&res).unwrap()["data"]["busy"], json!(false));
    }

    #[test]
    fn code_becomes_http_status() {
        let response = Res::with_code(StatusCode::UNPROCESSABLE_ENTITY, "ditolak", Some(1)).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
