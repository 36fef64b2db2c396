//! Test doubles shared by the service tests.

use crate::gateway::{GatewayError, GatewayOrder, GatewayOrderRequest, PaymentGateway};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};

/// Gateway that mints sequential order ids and signs as `sig:{order}|{payment}`
#[derive(Debug, Default)]
pub struct FakeGateway {
    fail: bool,
    next: AtomicU32,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `create_order` call fails
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sign(order_id: &str, payment_id: &str) -> String {
        format!("sig:{order_id}|{payment_id}")
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_order(&self, request: &GatewayOrderRequest) -> Result<GatewayOrder, GatewayError> {
        if self.fail {
            return Err(GatewayError::Network("connection refused".into()));
        }
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        Ok(GatewayOrder {
            id: format!("order_fake_{n}"),
            amount: request.amount,
            currency: request.currency.clone(),
            receipt: Some(request.receipt.clone()),
            status: "created".into(),
        })
    }

    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        signature == Self::sign(order_id, payment_id)
    }

    fn public_key(&self) -> &str {
        "rzp_test_fake"
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}
