//! # Registration Types
//!
//! A registration is a customer's booking for one course plus its payment
//! status. Created `pending`, completed once by payment verification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AcademyError, AcademyResult};

/// Payment status of a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    /// Created, awaiting payment confirmation
    Pending,
    /// Gateway signature verified
    Completed,
    /// Marked failed by an administrator
    Failed,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "pending",
            RegistrationStatus::Completed => "completed",
            RegistrationStatus::Failed => "failed",
        }
    }

    /// Only `pending` may move, and only forward.
    pub fn can_transition_to(&self, next: RegistrationStatus) -> bool {
        match (self, next) {
            (a, b) if *a == b => true,
            (RegistrationStatus::Pending, _) => true,
            _ => false,
        }
    }
}

impl Default for RegistrationStatus {
    fn default() -> Self {
        RegistrationStatus::Pending
    }
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower-case and trim an email for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// A persisted registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profession: Option<String>,
    /// Catalog course id
    pub course: String,
    /// Amount in paise, fixed at creation
    pub amount: i64,
    #[serde(default)]
    pub status: RegistrationStatus,
    /// Gateway payment handle, set on completion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    /// Gateway order handle, set on completion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Registration {
    /// Build a new pending registration with a generated id
    pub fn new(
        name: impl Into<String>,
        email: &str,
        phone_number: impl Into<String>,
        course: impl Into<String>,
        amount: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().simple().to_string(),
            name: name.into().trim().to_string(),
            email: normalize_email(email),
            phone_number: phone_number.into().trim().to_string(),
            profession: None,
            course: course.into(),
            amount,
            status: RegistrationStatus::Pending,
            payment_id: None,
            order_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder: set profession
    pub fn with_profession(mut self, profession: Option<String>) -> Self {
        self.profession = profession
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        self
    }

    /// Snapshot used to guard a read-modify-write
    pub fn revision(&self) -> Revision {
        Revision {
            status: self.status,
            updated_at: self.updated_at,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RegistrationStatus::Pending
    }

    /// Record a verified payment. No-op unless pending.
    pub fn complete(&mut self, payment_id: &str, order_id: &str) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.status = RegistrationStatus::Completed;
        self.payment_id = Some(payment_id.to_string());
        self.order_id = Some(order_id.to_string());
        self.updated_at = Utc::now();
        true
    }

    /// Apply an admin patch in place, enforcing the status transition rule
    pub fn apply(&mut self, patch: &RegistrationPatch) -> AcademyResult<()> {
        if let Some(next) = patch.status {
            if !self.status.can_transition_to(next) {
                return Err(AcademyError::validation(format!(
                    "Cannot change status from {} to {}",
                    self.status, next
                )));
            }
            self.status = next;
        }
        if let Some(name) = &patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(email) = &patch.email {
            self.email = normalize_email(email);
        }
        if let Some(phone) = &patch.phone_number {
            self.phone_number = phone.trim().to_string();
        }
        if let Some(profession) = &patch.profession {
            let profession = profession.trim();
            self.profession = (!profession.is_empty()).then(|| profession.to_string());
        }
        if let Some(course) = &patch.course {
            self.course = course.clone();
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// The state a stored registration must still be in for a replace to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Revision {
    pub status: RegistrationStatus,
    pub updated_at: DateTime<Utc>,
}

/// Fields an administrator may change. Amount is deliberately absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub profession: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub status: Option<RegistrationStatus>,
}

impl RegistrationPatch {
    pub fn validate(&self) -> AcademyResult<()> {
        let blank = |v: &Option<String>| v.as_deref().is_some_and(|s| s.trim().is_empty());
        if blank(&self.name) || blank(&self.email) || blank(&self.phone_number) {
            return Err(AcademyError::validation(
                "Name, email and phone number cannot be empty",
            ));
        }
        Ok(())
    }
}

/// Pagination request (1-based page)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: u64 = 10;
    pub const MAX_LIMIT: u64 = 1000;

    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: if limit == 0 {
                Self::DEFAULT_LIMIT
            } else {
                limit.min(Self::MAX_LIMIT)
            },
        }
    }

    /// Lenient parse of query-string values; garbage falls back to defaults
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Self {
        let parse = |v: Option<&str>| v.and_then(|s| s.trim().parse::<u64>().ok()).unwrap_or(0);
        Self::new(parse(page), parse(limit))
    }

    /// Number of records to skip. Saturates at `i64::MAX`, the largest skip
    /// a database cursor accepts.
    pub fn skip(&self) -> u64 {
        self.page
            .saturating_sub(1)
            .saturating_mul(self.limit)
            .min(i64::MAX as u64)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_LIMIT)
    }
}

/// One page of results
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            data,
            total,
            page: request.page,
            limit: request.limit,
            total_pages: total.div_ceil(request.limit),
        }
    }
}
