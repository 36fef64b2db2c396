//! # Order Service
//!
//! Booking submission: record a pending registration, then ask the gateway
//! for an order handle.
//!
//! The storefront must never block a sale on infrastructure. When the store
//! or gateway is missing the service answers with a synthetic order handle
//! produced by [`DemoFallback`], tagged with a [`DemoReason`].

use crate::catalog::{Course, CourseCatalog};
use crate::error::{AcademyError, AcademyResult};
use crate::gateway::{GatewayOrderRequest, SharedGateway};
use crate::registration::Registration;
use crate::store::StoreHandle;
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Booking form submission
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateOrder {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub course: String,
}

impl CreateOrder {
    fn validate(&self) -> AcademyResult<()> {
        let fields = [&self.name, &self.email, &self.phone_number, &self.course];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(AcademyError::validation("All fields are required"));
        }
        Ok(())
    }
}

/// Why an order was answered with synthetic data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoReason {
    StoreUnavailable,
    GatewayNotConfigured,
    GatewayFailed,
}

impl DemoReason {
    pub fn message(&self) -> &'static str {
        match self {
            DemoReason::StoreUnavailable => "Demo mode - database not connected",
            DemoReason::GatewayNotConfigured => "Demo mode - payment gateway not configured",
            DemoReason::GatewayFailed => "Demo mode - payment gateway order creation failed",
        }
    }
}

/// What the booking widget needs to open the gateway checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    pub order_id: String,
    pub registration_id: String,
    pub gateway_public_key: String,
    /// Paise
    pub amount: i64,
    pub course_name: String,
    #[serde(skip)]
    pub demo: Option<DemoReason>,
}

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Degrade-to-demo policy shared by every fallback path
#[derive(Debug, Clone)]
pub struct DemoFallback {
    public_key: String,
}

impl DemoFallback {
    pub fn new(public_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
        }
    }

    /// `order_<millis>_<9 base36 chars>`
    pub fn order_handle(&self) -> String {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..9)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        format!("order_{}_{}", Utc::now().timestamp_millis(), suffix)
    }

    /// `demo_<millis>`
    pub fn registration_id(&self) -> String {
        format!("demo_{}", Utc::now().timestamp_millis())
    }

    /// Synthetic receipt. Keeps a real registration id when one exists.
    pub fn receipt(
        &self,
        course: &Course,
        registration_id: Option<String>,
        reason: DemoReason,
    ) -> OrderReceipt {
        OrderReceipt {
            order_id: self.order_handle(),
            registration_id: registration_id.unwrap_or_else(|| self.registration_id()),
            gateway_public_key: self.public_key.clone(),
            amount: course.amount_minor(),
            course_name: course.name.clone(),
            demo: Some(reason),
        }
    }
}

impl Default for DemoFallback {
    fn default() -> Self {
        Self::new("rzp_test_demo")
    }
}

/// Creates registrations and gateway orders
#[derive(Clone)]
pub struct OrderService {
    store: StoreHandle,
    gateway: Option<SharedGateway>,
    catalog: Arc<CourseCatalog>,
    fallback: DemoFallback,
}

impl OrderService {
    pub fn new(
        store: StoreHandle,
        gateway: Option<SharedGateway>,
        catalog: Arc<CourseCatalog>,
        fallback: DemoFallback,
    ) -> Self {
        Self {
            store,
            gateway,
            catalog,
            fallback,
        }
    }

    #[instrument(skip(self, request), fields(course = %request.course))]
    pub async fn create_order(&self, request: CreateOrder) -> AcademyResult<OrderReceipt> {
        request.validate()?;

        let course = self.catalog.lookup(request.course.trim());
        if course.id != request.course.trim() {
            info!("Unknown course '{}', using {}", request.course, course.id);
        }

        let Some(store) = self.store.get() else {
            warn!("Store unavailable, answering with demo order");
            return Ok(self
                .fallback
                .receipt(course, None, DemoReason::StoreUnavailable));
        };

        let registration = Registration::new(
            &request.name,
            &request.email,
            &request.phone_number,
            &course.id,
            course.amount_minor(),
        );
        store.insert_registration(&registration).await?;
        info!(
            "Created registration {} for {} ({})",
            registration.id, course.id, registration.amount
        );

        let Some(gateway) = &self.gateway else {
            warn!("Payment gateway not configured, answering with demo order");
            return Ok(self.fallback.receipt(
                course,
                Some(registration.id),
                DemoReason::GatewayNotConfigured,
            ));
        };

        let order_request = GatewayOrderRequest::inr(
            registration.amount,
            format!("receipt_{}", registration.id),
        )
        .with_note("registration_id", &registration.id)
        .with_note("course", &course.id)
        .with_note("customer_name", &registration.name)
        .with_note("customer_email", &registration.email);

        match gateway.create_order(&order_request).await {
            Ok(order) => {
                info!(
                    "Created {} order {} for registration {}",
                    gateway.provider_name(),
                    order.id,
                    registration.id
                );
                Ok(OrderReceipt {
                    order_id: order.id,
                    registration_id: registration.id,
                    gateway_public_key: gateway.public_key().to_string(),
                    amount: registration.amount,
                    course_name: course.name.clone(),
                    demo: None,
                })
            }
            Err(e) => {
                error!("Gateway order creation failed: {}", e);
                Ok(self.fallback.receipt(
                    course,
                    Some(registration.id),
                    DemoReason::GatewayFailed,
                ))
            }
        }
    }
}
