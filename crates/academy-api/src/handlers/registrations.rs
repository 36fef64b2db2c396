//! Registration table, counters and revenue for the admin panel.

use crate::error::{ApiResult, Envelope};
use crate::extract::{AdminSession, ApiJson};
use crate::state::AppState;
use academy_core::{
    DashboardStats, NewRegistration, Page, PageRequest, Registration, RegistrationPatch,
    RevenueReport,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Raw paging parameters; parsed leniently
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EmailQuery {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct Count {
    pub count: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cleared {
    pub deleted_count: u64,
}

pub async fn list(
    _admin: AdminSession,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Envelope<Page<Registration>>>> {
    let request = PageRequest::parse(query.page.as_deref(), query.limit.as_deref());
    Ok(Json(Envelope::data(state.desk.page(request).await?)))
}

#[instrument(skip(state, request))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewRegistration>,
) -> ApiResult<(StatusCode, Json<Envelope<Registration>>)> {
    let registration = state.desk.create(request).await?;
    Ok((StatusCode::CREATED, Json(Envelope::data(registration))))
}

/// Every registration made with one email address
pub async fn search(
    _admin: AdminSession,
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> ApiResult<Json<Envelope<Vec<Registration>>>> {
    Ok(Json(Envelope::data(state.desk.find_by_email(&query.email).await?)))
}

pub async fn count(
    _admin: AdminSession,
    State(state): State<AppState>,
) -> ApiResult<Json<Envelope<Count>>> {
    let count = state.desk.count().await?;
    Ok(Json(Envelope::data(Count { count })))
}

pub async fn stats(
    _admin: AdminSession,
    State(state): State<AppState>,
) -> ApiResult<Json<Envelope<DashboardStats>>> {
    Ok(Json(Envelope::data(state.desk.stats().await?)))
}

pub async fn revenue(
    _admin: AdminSession,
    State(state): State<AppState>,
) -> ApiResult<Json<Envelope<RevenueReport>>> {
    Ok(Json(Envelope::data(state.desk.revenue().await?)))
}

pub async fn get(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<Registration>>> {
    Ok(Json(Envelope::data(state.desk.get(&id).await?)))
}

#[instrument(skip(state, admin, patch), fields(admin = %admin.0.id))]
pub async fn update(
    admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<RegistrationPatch>,
) -> ApiResult<Json<Envelope<Registration>>> {
    let updated = state.desk.update(&id, patch).await?;
    Ok(Json(Envelope::data(updated).with_message("Registration updated successfully")))
}

#[instrument(skip(state, admin), fields(admin = %admin.0.id))]
pub async fn delete(
    admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<()>>> {
    state.desk.delete(&id).await?;
    Ok(Json(Envelope::message("Registration deleted successfully")))
}

#[instrument(skip(state, admin), fields(admin = %admin.0.id))]
pub async fn clear(
    admin: AdminSession,
    State(state): State<AppState>,
) -> ApiResult<Json<Envelope<Cleared>>> {
    let deleted_count = state.desk.clear().await?;
    Ok(Json(
        Envelope::data(Cleared { deleted_count })
            .with_message(format!("Deleted {deleted_count} registrations")),
    ))
}
