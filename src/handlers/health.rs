use axum::{extract::State, response::IntoResponse};

use crate::{core::error::AppError, dtos::response::Res, state::AppState};

/// 健康检查：确认数据库可达。
pub async fn health(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    state.db.ping().await?;
    Ok(Res::<()>::with_msg("ok"))
}
