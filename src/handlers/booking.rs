// src/handlers/booking.rs
use axum::{
    extract::{ConnectInfo, Json, Path, State},
    response::IntoResponse,
};
use std::{net::SocketAddr, sync::Arc};
use uuid::Uuid;

use crate::{
    booking::{BookingSession, SessionRegistry},
    core::{
        constants::{OPEN_SESSION_LIMIT, OPEN_SESSION_WINDOW},
        error::{AppError, booking_status},
    },
    dtos::{appointment::AppointmentForm, booking::SubmitView, response::Res},
    rate_limit,
    state::AppState,
};

fn find_session(sessions: &SessionRegistry, id: &Uuid) -> Result<Arc<BookingSession>, AppError> {
    sessions
        .get(id)
        .ok_or_else(|| AppError::NotFound("Booking session not found".to_string()))
}

/// 打开预约会话。相当于访客打开预约页面：返回空表单与日期下限（今天）。
pub async fn open_session(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<impl IntoResponse, AppError> {
    rate_limit!(state.limiter, "open_session", &addr.ip().to_string(), OPEN_SESSION_LIMIT, OPEN_SESSION_WINDOW);

    let session = state.sessions.open();
    Ok(Res::created("Session opened", session.view()))
}

/// 查询会话当前状态：表单内容、提交中标记、当前通知。
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let session = find_session(&state.sessions, &id)?;
    Ok(Res::with_data(session.view()))
}

/// 提交预约表单。
///
/// # 返回值
/// - 201：预约成功，`data.ack` 带排队号与参考码，表单已清空
/// - 400 / 409 / 422 / 503：校验失败 / 上次提交未完成 / 存储拒绝 / 存储不可达，
///   `msg` 为展示给用户的文案，表单保留原值
pub async fn submit(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AppointmentForm>,
) -> Result<Res<SubmitView>, AppError> {
    let session = find_session(&state.sessions, &id)?;

    rate_limit!(
        state.limiter,
        "submit",
        &addr.ip().to_string(),
        state.config.submit_rate_limit,
        state.config.submit_rate_window_secs
    );

    Ok(submit_to(&session, payload).await)
}

/// 在会话上执行一次提交，并把结果连同提交后的会话视图装进响应。
async fn submit_to(session: &BookingSession, payload: AppointmentForm) -> Res<SubmitView> {
    match session.submit(payload).await {
        Ok(ack) => {
            let msg = ack.message.clone();
            Res::created(&msg, SubmitView { ack: Some(ack), session: session.view() })
        }
        Err(e) => Res::with_code(
            booking_status(&e),
            &e.to_string(),
            Some(SubmitView { ack: None, session: session.view() }),
        ),
    }
}

/// 关闭会话（访客离开页面）。
pub async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    if !state.sessions.close(&id) {
        return Err(AppError::NotFound("Booking session not found".to_string()));
    }
    Ok(Res::<()>::with_msg("Session closed"))
}
