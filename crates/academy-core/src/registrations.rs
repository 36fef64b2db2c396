//! Admin registration desk: paging, edits, direct creation and reports.

use crate::catalog::CourseCatalog;
use crate::error::{AcademyError, AcademyResult};
use crate::registration::{Page, PageRequest, Registration, RegistrationPatch};
use crate::revenue::{dashboard, revenue_by_course, DashboardStats, RevenueReport};
use crate::store::StoreHandle;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};

/// Registration created directly (no gateway order)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewRegistration {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub profession: Option<String>,
    #[serde(default)]
    pub course: String,
    /// Paise
    #[serde(default)]
    pub amount: i64,
}

/// Upper bound for a directly created amount: ₹1 crore, in paise
pub const MAX_AMOUNT: i64 = 1_000_000_000;

#[derive(Clone)]
pub struct RegistrationDesk {
    store: StoreHandle,
    catalog: Arc<CourseCatalog>,
}

impl RegistrationDesk {
    pub fn new(store: StoreHandle, catalog: Arc<CourseCatalog>) -> Self {
        Self { store, catalog }
    }

    #[instrument(skip(self, request))]
    pub async fn create(&self, request: NewRegistration) -> AcademyResult<Registration> {
        let required = [&request.name, &request.email, &request.phone_number, &request.course];
        if required.iter().any(|f| f.trim().is_empty()) {
            return Err(AcademyError::validation(
                "Name, email, phone number and course are required",
            ));
        }
        let course = request.course.trim();
        if !self.catalog.contains(course) {
            return Err(AcademyError::validation(format!("Unknown course '{course}'")));
        }
        if request.amount <= 0 {
            return Err(AcademyError::validation("Amount must be greater than zero"));
        }
        if request.amount > MAX_AMOUNT {
            return Err(AcademyError::validation(format!(
                "Amount must not exceed {MAX_AMOUNT} paise"
            )));
        }

        let store = self.store.require()?;
        let registration = Registration::new(
            &request.name,
            &request.email,
            &request.phone_number,
            course,
            request.amount,
        )
        .with_profession(request.profession);
        store.insert_registration(&registration).await?;

        info!("Created registration {} directly", registration.id);
        Ok(registration)
    }

    pub async fn page(&self, request: PageRequest) -> AcademyResult<Page<Registration>> {
        let store = self.store.require()?;
        let total = store.count_registrations().await?;
        let data = store.list_registrations(request).await?;
        Ok(Page::new(data, total, request))
    }

    pub async fn count(&self) -> AcademyResult<u64> {
        Ok(self.store.require()?.count_registrations().await?)
    }

    pub async fn get(&self, id: &str) -> AcademyResult<Registration> {
        self.store
            .require()?
            .get_registration(id)
            .await?
            .ok_or_else(|| AcademyError::not_found("Registration", id))
    }

    /// Registrations for one customer, newest first. Case-insensitive.
    pub async fn find_by_email(&self, email: &str) -> AcademyResult<Vec<Registration>> {
        if email.trim().is_empty() {
            return Err(AcademyError::validation("Email is required"));
        }
        Ok(self
            .store
            .require()?
            .find_registrations_by_email(email)
            .await?)
    }

    /// All registrations newest first; empty when the store is unavailable
    pub async fn orders(&self) -> AcademyResult<Vec<Registration>> {
        match self.store.get() {
            Some(store) => Ok(store.all_registrations().await?),
            None => Ok(Vec::new()),
        }
    }

    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: &str, patch: RegistrationPatch) -> AcademyResult<Registration> {
        patch.validate()?;
        if let Some(course) = patch.course.as_deref() {
            if !self.catalog.contains(course) {
                return Err(AcademyError::validation(format!("Unknown course '{course}'")));
            }
        }

        let store = self.store.require()?;
        let updated = store
            .update_registration(id, &patch)
            .await?
            .ok_or_else(|| AcademyError::not_found("Registration", id))?;
        info!("Updated registration {} (status {})", updated.id, updated.status);
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> AcademyResult<()> {
        if self.store.require()?.delete_registration(id).await? {
            info!("Deleted registration {}", id);
            Ok(())
        } else {
            Err(AcademyError::not_found("Registration", id))
        }
    }

    #[instrument(skip(self))]
    pub async fn clear(&self) -> AcademyResult<u64> {
        let deleted = self.store.require()?.clear_registrations().await?;
        info!("Cleared {} registrations", deleted);
        Ok(deleted)
    }

    pub async fn stats(&self) -> AcademyResult<DashboardStats> {
        let all = self.store.require()?.all_registrations().await?;
        Ok(dashboard(&all))
    }

    pub async fn revenue(&self) -> AcademyResult<RevenueReport> {
        let all = self.store.require()?.all_registrations().await?;
        Ok(revenue_by_course(&all, &self.catalog))
    }
}
