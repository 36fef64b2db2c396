//! Admin login, session and password reset endpoints.

use crate::error::{ApiResult, Envelope};
use crate::extract::{AdminSession, ApiJson};
use crate::state::AppState;
use academy_core::{AdminUser, Session, RESET_REQUESTED_MESSAGE};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct NewPasswordRequest {
    #[serde(default)]
    pub password: String,
}

#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<Json<Envelope<Session>>> {
    let session = state.guard.authenticate(&request.email, &request.password).await?;
    Ok(Json(Envelope::data(session)))
}

pub async fn me(AdminSession(user): AdminSession) -> Json<Envelope<AdminUser>> {
    Json(Envelope::data(user))
}

/// Tokens are not revocable; the client discards its copy
pub async fn logout() -> Json<Envelope<()>> {
    Json(Envelope::message("Logged out successfully"))
}

#[instrument(skip(state, request))]
pub async fn request_password_reset(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ResetRequest>,
) -> ApiResult<Json<Envelope<()>>> {
    state.guard.request_reset(&request.email).await?;
    Ok(Json(Envelope::message(RESET_REQUESTED_MESSAGE)))
}

#[instrument(skip(state, token, request))]
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    ApiJson(request): ApiJson<NewPasswordRequest>,
) -> ApiResult<Json<Envelope<()>>> {
    state.guard.complete_reset(&token, &request.password).await?;
    Ok(Json(Envelope::message("Password reset successfully")))
}
