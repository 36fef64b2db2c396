//! Checkout endpoints: order creation, payment verification, order listing.

use crate::error::{ApiResult, Envelope};
use crate::extract::{AdminSession, ApiJson};
use crate::state::AppState;
use academy_core::{CreateOrder, OrderReceipt, Registration, VerifyPayment};
use axum::{extract::State, Json};
use serde::Serialize;
use tracing::{info, instrument};

#[derive(Debug, Serialize)]
pub struct VerifiedPayment {
    pub verified: bool,
    pub registration: Registration,
}

#[instrument(skip(state, request), fields(course = %request.course))]
pub async fn create_order(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateOrder>,
) -> ApiResult<Json<Envelope<OrderReceipt>>> {
    let receipt = state.orders.create_order(request).await?;

    let demo = receipt.demo;
    let envelope = Envelope::data(receipt);
    Ok(Json(match demo {
        Some(reason) => envelope.with_message(reason.message()),
        None => envelope,
    }))
}

#[instrument(skip(state, request), fields(registration = %request.registration_id))]
pub async fn verify_payment(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<VerifyPayment>,
) -> ApiResult<Json<Envelope<VerifiedPayment>>> {
    let outcome = state.verifier.verify(request).await?;
    if !outcome.newly_completed {
        info!("Registration {} was already verified", outcome.registration.id);
    }

    // The confirmation task runs detached
    Ok(Json(Envelope::data(VerifiedPayment {
        verified: true,
        registration: outcome.registration,
    })))
}

pub async fn list_orders(
    _admin: AdminSession,
    State(state): State<AppState>,
) -> ApiResult<Json<Envelope<Vec<Registration>>>> {
    let orders = state.desk.orders().await?;
    let envelope = Envelope::data(orders);

    Ok(Json(if state.store.get().is_none() {
        envelope.with_message("Demo mode - database not connected")
    } else {
        envelope
    }))
}
