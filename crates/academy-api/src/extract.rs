//! Request extractors: JSON bodies with envelope rejections, and the admin
//! bearer session.

use crate::error::ApiError;
use crate::state::AppState;
use academy_core::AdminUser;
use axum::{
    extract::{FromRequest, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

/// `Json<T>` whose rejection renders as a failure envelope
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// The admin behind a valid `Authorization: Bearer <token>` header
#[derive(Debug, Clone)]
pub struct AdminSession(pub AdminUser);

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        let user = state.guard.authorize(token).await?;
        Ok(AdminSession(user))
    }
}
