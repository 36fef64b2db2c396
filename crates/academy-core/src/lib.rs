//! # academy-core
//!
//! Core types, services and traits for the academy registration API.
//!
//! This crate provides:
//! - `CourseCatalog` for the fixed course/price table
//! - `Registration` and the `Store` traits with an in-memory backend
//! - `OrderService` for booking + gateway order creation, with demo fallback
//! - `PaymentVerifier` for checkout callback verification
//! - `MeetingLinkRegistry` for meeting link CRUD
//! - `AdminGuard` for admin login, bearer tokens and password reset
//! - `Notifier` and the confirmation/reset email templates
//! - `AcademyError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use academy_core::{CourseCatalog, CreateOrder, DemoFallback, OrderService, StoreHandle};
//!
//! let service = OrderService::new(store, Some(gateway), catalog, DemoFallback::default());
//!
//! let receipt = service.create_order(CreateOrder {
//!     name: "Asha".into(),
//!     email: "asha@example.com".into(),
//!     phone_number: "9999999999".into(),
//!     course: "live-workshops".into(),
//! }).await?;
//!
//! // Hand receipt.order_id and receipt.gateway_public_key to the checkout widget
//! ```

pub mod auth;
pub mod catalog;
pub mod error;
pub mod gateway;
pub mod meeting;
pub mod memory;
pub mod notify;
pub mod order;
pub mod registration;
pub mod registrations;
pub mod revenue;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod verification;

// Re-exports for convenience
pub use auth::{AdminGuard, AdminRole, AdminUser, Claims, GuardConfig, Session, RESET_REQUESTED_MESSAGE};
pub use catalog::{Course, CourseCatalog};
pub use error::{AcademyError, AcademyResult, Dependency};
pub use gateway::{GatewayError, GatewayOrder, GatewayOrderRequest, PaymentGateway, SharedGateway};
pub use meeting::{LinkFilter, MeetingLink, MeetingLinkPatch, MeetingLinkRegistry, MeetingTarget, NewMeetingLink};
pub use memory::MemoryStore;
pub use notify::{
    ConfirmationDispatcher, EmailMessage, LogNotifier, Notifier, NotifyError, NotifyResult,
    RecordingNotifier, SharedNotifier,
};
pub use order::{CreateOrder, DemoFallback, DemoReason, OrderReceipt, OrderService};
pub use registration::{
    normalize_email, Page, PageRequest, Registration, RegistrationPatch, RegistrationStatus,
    Revision,
};
pub use registrations::{NewRegistration, RegistrationDesk};
pub use revenue::{CourseRevenue, DashboardStats, RevenueReport};
pub use store::{
    AdminStore, ConnectionStatus, MeetingLinkStore, RegistrationStore, SharedStore, Store,
    StoreError, StoreHandle, StoreResult,
};
pub use verification::{PaymentVerifier, VerificationOutcome, VerifyPayment};
