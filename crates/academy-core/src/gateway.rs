//! # Payment Gateway Trait
//!
//! The seam between the order/verification services and a payment provider.
//! `academy-razorpay` implements it against the Razorpay Orders API.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │        PaymentGateway (trait)            │
//! │  ├── create_order()                      │
//! │  ├── verify_signature()                  │
//! │  ├── public_key()                        │
//! │  └── provider_name()                     │
//! └──────────────────────────────────────────┘
//!                     ▲
//!            ┌────────┴────────┐
//!            │ RazorpayGateway │
//!            └─────────────────┘
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors from a payment provider
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Missing or malformed credentials
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network/HTTP error communicating with provider
    #[error("Network error: {0}")]
    Network(String),

    /// Provider returned an error response
    #[error("Provider error [{provider}] {status}: {message}")]
    Provider {
        provider: String,
        status: u16,
        message: String,
    },

    /// Provider response could not be parsed
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Order to create at the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayOrderRequest {
    /// Smallest currency unit
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    pub notes: BTreeMap<String, String>,
}

impl GatewayOrderRequest {
    pub fn inr(amount: i64, receipt: impl Into<String>) -> Self {
        Self {
            amount,
            currency: "INR".to_string(),
            receipt: receipt.into(),
            notes: BTreeMap::new(),
        }
    }

    /// Builder: add a note
    pub fn with_note(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.notes.insert(key.into(), value.into());
        self
    }
}

/// Order handle minted by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Mint an order handle the checkout widget can pay against
    async fn create_order(&self, request: &GatewayOrderRequest) -> Result<GatewayOrder, GatewayError>;

    /// Check the signature the checkout widget returned for a payment
    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool;

    /// Key the browser widget is initialised with
    fn public_key(&self) -> &str;

    /// Provider name (for logging)
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared gateway (dynamic dispatch)
pub type SharedGateway = Arc<dyn PaymentGateway>;
