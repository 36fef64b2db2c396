//! # Store Traits
//!
//! Persistence seams for registrations, meeting links and admin accounts.
//! Backends: [`MemoryStore`](crate::memory::MemoryStore) and the MongoDB store
//! in `academy-mongo`.
//!
//! Services receive a [`StoreHandle`] at construction. The handle carries the
//! connection status, so "is the database there?" is answered once at wiring
//! time instead of being probed before every operation.

use crate::auth::AdminUser;
use crate::error::{AcademyError, Dependency};
use crate::meeting::MeetingLink;
use crate::registration::{PageRequest, Registration, RegistrationPatch, Revision};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by a store backend
#[derive(Debug, Error)]
pub enum StoreError {
    /// Lost or refused connection
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query or write rejected by the backend
    #[error("Query error: {0}")]
    Query(String),

    /// Stored document could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<StoreError> for AcademyError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Connection(msg) => AcademyError::unavailable(Dependency::Database, msg),
            other => AcademyError::Internal(other.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait RegistrationStore: Send + Sync {
    async fn insert_registration(&self, registration: &Registration) -> StoreResult<()>;

    async fn get_registration(&self, id: &str) -> StoreResult<Option<Registration>>;

    /// Case-insensitive; implementations normalize `email` themselves. Newest first.
    async fn find_registrations_by_email(&self, email: &str) -> StoreResult<Vec<Registration>>;

    /// Newest first
    async fn list_registrations(&self, page: PageRequest) -> StoreResult<Vec<Registration>>;

    /// Newest first
    async fn all_registrations(&self) -> StoreResult<Vec<Registration>>;

    async fn count_registrations(&self) -> StoreResult<u64>;

    /// Persist an already-patched registration if the stored copy still
    /// matches `expected`. False if the id is gone or the record has moved on.
    async fn replace_registration(
        &self,
        registration: &Registration,
        expected: Revision,
    ) -> StoreResult<bool>;

    /// Conditionally move a `pending` registration to `completed`.
    ///
    /// Returns the updated record only if this call performed the transition.
    async fn complete_payment(
        &self,
        id: &str,
        payment_id: &str,
        order_id: &str,
    ) -> StoreResult<Option<Registration>>;

    async fn delete_registration(&self, id: &str) -> StoreResult<bool>;

    /// Returns the number of deleted records
    async fn clear_registrations(&self) -> StoreResult<u64>;

    /// Apply a patch over get + guarded replace. A record that changed in
    /// between (e.g. a payment completed) is reported as a conflict.
    async fn update_registration(
        &self,
        id: &str,
        patch: &RegistrationPatch,
    ) -> Result<Option<Registration>, AcademyError> {
        let Some(mut registration) = self.get_registration(id).await? else {
            return Ok(None);
        };
        let expected = registration.revision();
        registration.apply(patch)?;

        if self.replace_registration(&registration, expected).await? {
            return Ok(Some(registration));
        }
        match self.get_registration(id).await? {
            Some(_) => Err(AcademyError::validation(
                "Registration changed while it was being updated; reload and try again",
            )),
            None => Ok(None),
        }
    }
}

#[async_trait]
pub trait MeetingLinkStore: Send + Sync {
    async fn insert_meeting_link(&self, link: &MeetingLink) -> StoreResult<()>;

    async fn get_meeting_link(&self, id: &str) -> StoreResult<Option<MeetingLink>>;

    /// Newest first
    async fn list_meeting_links(&self, active_only: bool) -> StoreResult<Vec<MeetingLink>>;

    async fn replace_meeting_link(&self, link: &MeetingLink) -> StoreResult<bool>;

    async fn delete_meeting_link(&self, id: &str) -> StoreResult<bool>;
}

#[async_trait]
pub trait AdminStore: Send + Sync {
    async fn insert_admin(&self, user: &AdminUser) -> StoreResult<()>;

    async fn get_admin(&self, id: &str) -> StoreResult<Option<AdminUser>>;

    /// `email` is already normalized
    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<AdminUser>>;

    async fn find_admin_by_reset_hash(&self, token_hash: &str) -> StoreResult<Option<AdminUser>>;

    async fn replace_admin(&self, user: &AdminUser) -> StoreResult<bool>;
}

/// A complete storage backend
pub trait Store: RegistrationStore + MeetingLinkStore + AdminStore {
    /// Backend name for health reporting
    fn backend_name(&self) -> &'static str;
}

/// Type alias for a shared store (dynamic dispatch)
pub type SharedStore = Arc<dyn Store>;

/// Connection status of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    Unavailable,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Unavailable => "unavailable",
        }
    }
}

/// Store dependency handed to services at construction
#[derive(Clone)]
pub enum StoreHandle {
    Connected(SharedStore),
    Unavailable { reason: String },
}

impl StoreHandle {
    pub fn connected(store: SharedStore) -> Self {
        StoreHandle::Connected(store)
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        StoreHandle::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        match self {
            StoreHandle::Connected(_) => ConnectionStatus::Connected,
            StoreHandle::Unavailable { .. } => ConnectionStatus::Unavailable,
        }
    }

    /// The store if connected
    pub fn get(&self) -> Option<&SharedStore> {
        match self {
            StoreHandle::Connected(store) => Some(store),
            StoreHandle::Unavailable { .. } => None,
        }
    }

    /// The store, or `DependencyUnavailable`
    pub fn require(&self) -> Result<&SharedStore, AcademyError> {
        match self {
            StoreHandle::Connected(store) => Ok(store),
            StoreHandle::Unavailable { reason } => {
                Err(AcademyError::unavailable(Dependency::Database, reason.clone()))
            }
        }
    }
}

impl std::fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreHandle::Connected(store) => {
                f.debug_tuple("Connected").field(&store.backend_name()).finish()
            }
            StoreHandle::Unavailable { reason } => f
                .debug_struct("Unavailable")
                .field("reason", reason)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::registration::RegistrationStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_unavailable_handle_requires() {
        let handle = StoreHandle::unavailable("MONGODB_URI not set");

        assert_eq!(handle.status(), ConnectionStatus::Unavailable);
        let err = handle.require().err().unwrap();
        assert_eq!(err.status_code(), 503);
    }

    #[test]
    fn test_connected_handle() {
        let handle = StoreHandle::connected(Arc::new(MemoryStore::new()));

        assert_eq!(handle.status(), ConnectionStatus::Connected);
        assert!(handle.get().is_some());
    }

    #[test]
    fn test_connection_error_maps_to_unavailable() {
        let err: AcademyError = StoreError::Connection("timed out".into()).into();
        assert_eq!(err.status_code(), 503);

        let err: AcademyError = StoreError::Query("bad".into()).into();
        assert_eq!(err.status_code(), 500);
    }

    /// Completes the payment right after the first read, as a concurrent
    /// verification would.
    struct PaidDuringEdit {
        inner: MemoryStore,
        reads: AtomicUsize,
    }

    #[async_trait]
    impl RegistrationStore for PaidDuringEdit {
        async fn insert_registration(&self, registration: &Registration) -> StoreResult<()> {
            self.inner.insert_registration(registration).await
        }

        async fn get_registration(&self, id: &str) -> StoreResult<Option<Registration>> {
            let found = self.inner.get_registration(id).await?;
            if self.reads.fetch_add(1, Ordering::SeqCst) == 0 {
                self.inner.complete_payment(id, "pay_1", "order_1").await?;
            }
            Ok(found)
        }

        async fn find_registrations_by_email(&self, email: &str) -> StoreResult<Vec<Registration>> {
            self.inner.find_registrations_by_email(email).await
        }

        async fn list_registrations(&self, page: PageRequest) -> StoreResult<Vec<Registration>> {
            self.inner.list_registrations(page).await
        }

        async fn all_registrations(&self) -> StoreResult<Vec<Registration>> {
            self.inner.all_registrations().await
        }

        async fn count_registrations(&self) -> StoreResult<u64> {
            self.inner.count_registrations().await
        }

        async fn replace_registration(
            &self,
            registration: &Registration,
            expected: Revision,
        ) -> StoreResult<bool> {
            self.inner.replace_registration(registration, expected).await
        }

        async fn complete_payment(
            &self,
            id: &str,
            payment_id: &str,
            order_id: &str,
        ) -> StoreResult<Option<Registration>> {
            self.inner.complete_payment(id, payment_id, order_id).await
        }

        async fn delete_registration(&self, id: &str) -> StoreResult<bool> {
            self.inner.delete_registration(id).await
        }

        async fn clear_registrations(&self) -> StoreResult<u64> {
            self.inner.clear_registrations().await
        }
    }

    #[tokio::test]
    async fn test_update_racing_a_payment_is_a_conflict() {
        let store = PaidDuringEdit {
            inner: MemoryStore::new(),
            reads: AtomicUsize::new(0),
        };
        let r = Registration::new("A", "a@x.com", "1", "live-workshops", 29900);
        store.insert_registration(&r).await.unwrap();

        let patch = RegistrationPatch {
            name: Some("Renamed".into()),
            ..Default::default()
        };
        let err = store.update_registration(&r.id, &patch).await.unwrap_err();
        assert!(matches!(err, AcademyError::Validation(_)));

        let stored = store.inner.get_registration(&r.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RegistrationStatus::Completed);
        assert_eq!(stored.payment_id.as_deref(), Some("pay_1"));
        assert_eq!(stored.order_id.as_deref(), Some("order_1"));
        assert_eq!(stored.name, "A");

        // A fresh attempt sees the completed record and applies
        let updated = store.update_registration(&r.id, &patch).await.unwrap().unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.status, RegistrationStatus::Completed);
    }

    #[tokio::test]
    async fn test_update_missing_is_none() {
        let store = MemoryStore::new();
        let patch = RegistrationPatch::default();

        assert!(store.update_registration("missing", &patch).await.unwrap().is_none());
    }
}
