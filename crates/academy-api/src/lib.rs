//! # academy-api
//!
//! HTTP API layer for the academy registration service.
//!
//! This crate provides:
//! - Axum-based HTTP server and router
//! - Environment-driven configuration and dependency wiring
//! - The `{success, data?, error?, message?}` response envelope
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/api/health` | Health and dependency status |
//! | GET | `/api/courses` | Course catalog |
//! | POST | `/api/orders/create` | Register and create a gateway order |
//! | POST | `/api/payments/verify` | Verify a checkout callback |
//! | GET | `/api/meeting-links/active` | Active meeting links |
//! | POST | `/api/auth/login` | Admin login |
//! | GET | `/api/registrations` | Paged registrations (admin) |

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod state;

#[cfg(test)]
mod api_tests;

pub use config::AppConfig;
pub use routes::create_router;
pub use state::AppState;
