//! # Request Handlers
//!
//! Axum request handlers, grouped by area. Each handler delegates to a
//! service on [`AppState`] and wraps the result in an [`Envelope`].

pub mod auth;
pub mod meetings;
pub mod orders;
pub mod registrations;

use crate::error::Envelope;
use crate::state::AppState;
use academy_core::{ConnectionStatus, Course};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Health check with dependency status
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let database = match state.store.status() {
        ConnectionStatus::Connected => "connected",
        ConnectionStatus::Unavailable => "unavailable",
    };
    let gateway = if state.gateway.is_some() { "configured" } else { "demo" };
    let mail = if state.notifier.delivers() { "configured" } else { "log-only" };

    Json(json!({
        "status": "OK",
        "service": "academy-api",
        "version": env!("CARGO_PKG_VERSION"),
        "dependencyState": {
            "database": database,
            "gateway": gateway,
            "mail": mail,
        }
    }))
}

/// Public course listing
pub async fn list_courses(State(state): State<AppState>) -> Json<Envelope<Vec<Course>>> {
    Json(Envelope::data(state.catalog.all().cloned().collect()))
}

/// Unknown routes
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(Envelope::error("Route not found")))
}
