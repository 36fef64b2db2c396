//! # Payment Verification
//!
//! Confirms a checkout callback and completes the registration.
//!
//! ```text
//! fields present? ──► gateway configured? ──► signature valid?
//!        │                    │                      │
//!       400                  503                    400
//!                                                    ▼
//!                    store connected? ──► registration exists?
//!                           │                      │
//!                          503                    404
//!                                                  ▼
//!                  pending ──► completed + confirmation email
//!                  completed ──► returned unchanged (no email)
//!                  failed ──► 400
//! ```
//!
//! The transition itself is the store's conditional `complete_payment`, so of
//! two concurrent callbacks for one registration only one sends an email.

use crate::catalog::CourseCatalog;
use crate::error::{AcademyError, AcademyResult, Dependency};
use crate::gateway::SharedGateway;
use crate::notify::{Confirmation, ConfirmationDispatcher, NotifyResult};
use crate::registration::{Registration, RegistrationStatus};
use crate::store::StoreHandle;
use serde::Deserialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

/// Checkout callback fields
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyPayment {
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub payment_id: String,
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub registration_id: String,
    #[serde(default)]
    pub course_id: String,
}

impl VerifyPayment {
    fn validate(&self) -> AcademyResult<()> {
        let fields = [
            &self.order_id,
            &self.payment_id,
            &self.signature,
            &self.registration_id,
            &self.course_id,
        ];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(AcademyError::validation(
                "All payment verification fields are required",
            ));
        }
        Ok(())
    }
}

/// Result of a successful verification
#[derive(Debug)]
pub struct VerificationOutcome {
    pub registration: Registration,
    /// True only for the call that moved the record out of `pending`
    pub newly_completed: bool,
    /// Detached confirmation delivery, present when `newly_completed`
    pub notification: Option<JoinHandle<NotifyResult>>,
}

#[derive(Clone)]
pub struct PaymentVerifier {
    store: StoreHandle,
    gateway: Option<SharedGateway>,
    catalog: Arc<CourseCatalog>,
    dispatcher: ConfirmationDispatcher,
}

impl PaymentVerifier {
    pub fn new(
        store: StoreHandle,
        gateway: Option<SharedGateway>,
        catalog: Arc<CourseCatalog>,
        dispatcher: ConfirmationDispatcher,
    ) -> Self {
        Self {
            store,
            gateway,
            catalog,
            dispatcher,
        }
    }

    #[instrument(skip(self, request), fields(registration = %request.registration_id))]
    pub async fn verify(&self, request: VerifyPayment) -> AcademyResult<VerificationOutcome> {
        request.validate()?;

        let gateway = self.gateway.as_ref().ok_or_else(|| {
            AcademyError::unavailable(
                Dependency::PaymentGateway,
                "payment gateway credentials not configured",
            )
        })?;

        if !gateway.verify_signature(&request.order_id, &request.payment_id, &request.signature) {
            warn!("Signature mismatch for order {}", request.order_id);
            return Err(AcademyError::InvalidSignature);
        }

        let store = self.store.require()?;
        let registration = store
            .get_registration(&request.registration_id)
            .await?
            .ok_or_else(|| AcademyError::not_found("Registration", &request.registration_id))?;

        match registration.status {
            RegistrationStatus::Completed => {
                info!("Registration {} already completed", registration.id);
                return Ok(VerificationOutcome {
                    registration,
                    newly_completed: false,
                    notification: None,
                });
            }
            RegistrationStatus::Failed => {
                return Err(AcademyError::validation(
                    "Registration is marked failed and cannot be completed",
                ));
            }
            RegistrationStatus::Pending => {}
        }

        let completed = store
            .complete_payment(&registration.id, &request.payment_id, &request.order_id)
            .await?;

        let Some(registration) = completed else {
            // Another callback won the transition; report the current record.
            let current = store
                .get_registration(&request.registration_id)
                .await?
                .ok_or_else(|| AcademyError::not_found("Registration", &request.registration_id))?;
            if current.status == RegistrationStatus::Failed {
                return Err(AcademyError::validation(
                    "Registration is marked failed and cannot be completed",
                ));
            }
            return Ok(VerificationOutcome {
                registration: current,
                newly_completed: false,
                notification: None,
            });
        };

        info!(
            "Payment {} verified for registration {}",
            request.payment_id, registration.id
        );

        let course = self.catalog.lookup(request.course_id.trim());
        let notification = self.dispatcher.dispatch(Confirmation {
            email: registration.email.clone(),
            name: registration.name.clone(),
            course_id: course.id.clone(),
            course_name: course.name.clone(),
            course_price: course.price,
            registration_id: registration.id.clone(),
        });

        Ok(VerificationOutcome {
            registration,
            newly_completed: true,
            notification: Some(notification),
        })
    }
}
