//! Meeting link CRUD (admin) and the public active listing.

use crate::error::{ApiResult, Envelope};
use crate::extract::{AdminSession, ApiJson};
use crate::state::AppState;
use academy_core::{LinkFilter, MeetingLink, MeetingLinkPatch, NewMeetingLink};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

pub async fn list(
    _admin: AdminSession,
    State(state): State<AppState>,
) -> ApiResult<Json<Envelope<Vec<MeetingLink>>>> {
    Ok(Json(Envelope::data(state.meetings.list(LinkFilter::All).await?)))
}

pub async fn list_active(
    State(state): State<AppState>,
) -> ApiResult<Json<Envelope<Vec<MeetingLink>>>> {
    Ok(Json(Envelope::data(
        state.meetings.list(LinkFilter::ActiveOnly).await?,
    )))
}

pub async fn create(
    _admin: AdminSession,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewMeetingLink>,
) -> ApiResult<(StatusCode, Json<Envelope<MeetingLink>>)> {
    let link = state.meetings.create(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::data(link).with_message("Meeting link created successfully")),
    ))
}

pub async fn update(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<MeetingLinkPatch>,
) -> ApiResult<Json<Envelope<MeetingLink>>> {
    let link = state.meetings.update(&id, patch).await?;
    Ok(Json(Envelope::data(link).with_message("Meeting link updated successfully")))
}

pub async fn delete(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<()>>> {
    state.meetings.delete(&id).await?;
    Ok(Json(Envelope::message("Meeting link deleted successfully")))
}
