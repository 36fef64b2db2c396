//! # academy-razorpay
//!
//! Razorpay implementation of [`academy_core::PaymentGateway`].
//!
//! - **Orders**: `POST /v1/orders` creates the order handle the checkout
//!   widget pays against.
//! - **Signatures**: the widget's callback carries an HMAC-SHA256 over
//!   `order_id|payment_id`, keyed with the account secret.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use academy_razorpay::RazorpayGateway;
//!
//! // None when RAZORPAY_KEY_ID / RAZORPAY_KEY_SECRET are unset
//! let gateway = RazorpayGateway::from_env()?;
//! ```

pub mod config;
pub mod gateway;
pub mod signature;

// Re-exports
pub use config::RazorpayConfig;
pub use gateway::RazorpayGateway;
pub use signature::{expected_signature, verify_signature};
