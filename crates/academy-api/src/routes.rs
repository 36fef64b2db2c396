//! # Routes
//!
//! Axum router configuration for the academy API. Everything lives under
//! `/api`; admin routes authenticate through the [`AdminSession`] extractor.
//!
//! [`AdminSession`]: crate::extract::AdminSession

use crate::error::Envelope;
use crate::handlers::{self, auth, meetings, orders, registrations};
use crate::state::AppState;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use std::any::Any;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::error;

/// Create the main application router
///
/// Routes:
/// - Public:
///   - GET  /api/health, /api/courses, /api/meeting-links/active
///   - POST /api/orders/create, /api/payments/verify, /api/registrations
///   - POST /api/auth/login, /api/auth/logout
///   - POST /api/auth/reset-password, /api/auth/reset-password/{token}
///
/// - Admin (bearer token):
///   - GET  /api/auth/me, /api/orders
///   - GET/DELETE /api/registrations, GET /api/registrations/{count,stats,revenue}
///   - GET  /api/registrations/search?email=
///   - GET/PUT/DELETE /api/registrations/{id}
///   - GET/POST /api/meeting-links, PUT/DELETE /api/meeting-links/{id}
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        .route("/logout", post(auth::logout))
        .route("/reset-password", post(auth::request_password_reset))
        .route("/reset-password/{token}", post(auth::reset_password));

    let order_routes = Router::new()
        .route("/", get(orders::list_orders))
        .route("/create", post(orders::create_order));

    let payment_routes = Router::new().route("/verify", post(orders::verify_payment));

    let registration_routes = Router::new()
        .route(
            "/",
            get(registrations::list)
                .post(registrations::create)
                .delete(registrations::clear),
        )
        .route("/count", get(registrations::count))
        .route("/search", get(registrations::search))
        .route("/stats", get(registrations::stats))
        .route("/revenue", get(registrations::revenue))
        .route(
            "/{id}",
            get(registrations::get)
                .put(registrations::update)
                .delete(registrations::delete),
        );

    let meeting_routes = Router::new()
        .route("/", get(meetings::list).post(meetings::create))
        .route("/active", get(meetings::list_active))
        .route("/{id}", put(meetings::update).delete(meetings::delete));

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/courses", get(handlers::list_courses))
        .nest("/auth", auth_routes)
        .nest("/orders", order_routes)
        .nest("/payments", payment_routes)
        .nest("/registrations", registration_routes)
        .nest("/meeting-links", meeting_routes);

    Router::new()
        .nest("/api", api_routes)
        .fallback(handlers::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(CatchPanicLayer::custom(panic_response)),
        )
        .with_state(state)
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(Envelope::error("Something went wrong!")),
    )
        .into_response()
}
