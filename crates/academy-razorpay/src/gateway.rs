//! # Razorpay Orders
//!
//! `POST /v1/orders` with HTTP basic auth (`key_id:key_secret`) and a JSON
//! body. The returned order id is what the checkout widget pays against.

use crate::config::RazorpayConfig;
use crate::signature;
use academy_core::{GatewayError, GatewayOrder, GatewayOrderRequest, PaymentGateway};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

const PROVIDER: &str = "razorpay";

pub struct RazorpayGateway {
    config: RazorpayConfig,
    client: Client,
}

impl RazorpayGateway {
    pub fn new(config: RazorpayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GatewayError::Configuration(format!("HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables; `Ok(None)` when unconfigured
    pub fn from_env() -> Result<Option<Self>, GatewayError> {
        RazorpayConfig::from_env()?.map(Self::new).transpose()
    }

    pub fn config(&self) -> &RazorpayConfig {
        &self.config
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    #[instrument(skip(self, request), fields(receipt = %request.receipt))]
    async fn create_order(&self, request: &GatewayOrderRequest) -> Result<GatewayOrder, GatewayError> {
        if request.amount <= 0 {
            return Err(GatewayError::Configuration(
                "Order amount must be positive".to_string(),
            ));
        }

        debug!(
            "Creating Razorpay order: amount={} {}",
            request.amount, request.currency
        );

        let url = format!("{}/v1/orders", self.config.api_base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(request)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        if !status.is_success() {
            error!("Razorpay API error: status={}, body={}", status, body);

            let message = serde_json::from_str::<RazorpayErrorResponse>(&body)
                .map(|r| r.error.description)
                .unwrap_or_else(|_| format!("HTTP {}: {}", status, body));

            return Err(GatewayError::Provider {
                provider: PROVIDER.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let order: GatewayOrder = serde_json::from_str(&body).map_err(|e| {
            GatewayError::Serialization(format!("Failed to parse Razorpay order: {}", e))
        })?;

        info!("Created Razorpay order: id={}, status={}", order.id, order.status);
        Ok(order)
    }

    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        signature::verify_signature(&self.config.key_secret, order_id, payment_id, signature)
    }

    fn public_key(&self) -> &str {
        &self.config.key_id
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Razorpay API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct RazorpayErrorResponse {
    error: RazorpayError,
}

#[derive(Debug, Deserialize)]
struct RazorpayError {
    #[serde(default)]
    description: String,
}
