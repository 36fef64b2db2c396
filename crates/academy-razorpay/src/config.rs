//! # Razorpay Configuration
//!
//! Credentials are loaded from environment variables. Both keys absent means
//! the gateway is simply not configured; a half-configured or malformed pair
//! is an error.

use academy_core::GatewayError;
use std::env;

pub const DEFAULT_API_BASE_URL: &str = "https://api.razorpay.com";

/// Razorpay API configuration
#[derive(Clone)]
pub struct RazorpayConfig {
    /// Public key id (rzp_test_... or rzp_live_...), handed to the checkout widget
    pub key_id: String,

    /// Secret key, used for API auth and callback signatures
    pub key_secret: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,
}

impl RazorpayConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads `RAZORPAY_KEY_ID`, `RAZORPAY_KEY_SECRET` and optionally
    /// `RAZORPAY_API_BASE_URL`. Returns `Ok(None)` when neither key is set.
    pub fn from_env() -> Result<Option<Self>, GatewayError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<Self>, GatewayError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let (key_id, key_secret) = match (get("RAZORPAY_KEY_ID"), get("RAZORPAY_KEY_SECRET")) {
            (None, None) => return Ok(None),
            (Some(id), Some(secret)) => (id, secret),
            (Some(_), None) => {
                return Err(GatewayError::Configuration(
                    "RAZORPAY_KEY_SECRET not set".to_string(),
                ))
            }
            (None, Some(_)) => {
                return Err(GatewayError::Configuration(
                    "RAZORPAY_KEY_ID not set".to_string(),
                ))
            }
        };

        if !key_id.starts_with("rzp_test_") && !key_id.starts_with("rzp_live_") {
            return Err(GatewayError::Configuration(
                "RAZORPAY_KEY_ID must start with rzp_test_ or rzp_live_".to_string(),
            ));
        }

        let mut config = Self::new(key_id, key_secret);
        if let Some(url) = get("RAZORPAY_API_BASE_URL") {
            config.api_base_url = url;
        }
        Ok(Some(config))
    }

    /// Create config with explicit values (for testing)
    pub fn new(key_id: impl Into<String>, key_secret: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            key_secret: key_secret.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    pub fn is_test_mode(&self) -> bool {
        self.key_id.starts_with("rzp_test_")
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

impl std::fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayConfig")
            .field("key_id", &self.key_id)
            .field("api_base_url", &self.api_base_url)
            .finish_non_exhaustive()
    }
}
