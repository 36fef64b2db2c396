//! In-process store backend.
//!
//! Used when `STORE_BACKEND=memory` and by every service test. Records are
//! kept in insertion order; "newest first" listings walk the vectors in
//! reverse so equal timestamps still order deterministically.

use crate::auth::AdminUser;
use crate::meeting::MeetingLink;
use crate::registration::{normalize_email, PageRequest, Registration, RegistrationStatus, Revision};
use crate::store::{AdminStore, MeetingLinkStore, RegistrationStore, Store, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStore {
    registrations: RwLock<Vec<Registration>>,
    meeting_links: RwLock<Vec<MeetingLink>>,
    admins: RwLock<Vec<AdminUser>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn replace_by_id<T>(items: &mut [T], id: &str, id_of: impl Fn(&T) -> &str, value: &T) -> bool
where
    T: Clone,
{
    match items.iter_mut().find(|item| id_of(item) == id) {
        Some(slot) => {
            *slot = value.clone();
            true
        }
        None => false,
    }
}

#[async_trait]
impl RegistrationStore for MemoryStore {
    async fn insert_registration(&self, registration: &Registration) -> StoreResult<()> {
        let mut registrations = self.registrations.write().await;
        if registrations.iter().any(|r| r.id == registration.id) {
            return Err(StoreError::Query(format!(
                "duplicate registration id {}",
                registration.id
            )));
        }
        registrations.push(registration.clone());
        Ok(())
    }

    async fn get_registration(&self, id: &str) -> StoreResult<Option<Registration>> {
        let registrations = self.registrations.read().await;
        Ok(registrations.iter().find(|r| r.id == id).cloned())
    }

    async fn find_registrations_by_email(&self, email: &str) -> StoreResult<Vec<Registration>> {
        let email = normalize_email(email);
        let registrations = self.registrations.read().await;
        Ok(registrations
            .iter()
            .rev()
            .filter(|r| r.email == email)
            .cloned()
            .collect())
    }

    async fn list_registrations(&self, page: PageRequest) -> StoreResult<Vec<Registration>> {
        let registrations = self.registrations.read().await;
        Ok(registrations
            .iter()
            .rev()
            .skip(usize::try_from(page.skip()).unwrap_or(usize::MAX))
            .take(page.limit as usize)
            .cloned()
            .collect())
    }

    async fn all_registrations(&self) -> StoreResult<Vec<Registration>> {
        let registrations = self.registrations.read().await;
        Ok(registrations.iter().rev().cloned().collect())
    }

    async fn count_registrations(&self) -> StoreResult<u64> {
        Ok(self.registrations.read().await.len() as u64)
    }

    async fn replace_registration(
        &self,
        registration: &Registration,
        expected: Revision,
    ) -> StoreResult<bool> {
        // Compare and write under one lock
        let mut registrations = self.registrations.write().await;
        match registrations
            .iter_mut()
            .find(|r| r.id == registration.id && r.revision() == expected)
        {
            Some(slot) => {
                *slot = registration.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn complete_payment(
        &self,
        id: &str,
        payment_id: &str,
        order_id: &str,
    ) -> StoreResult<Option<Registration>> {
        // Check-and-set under one write lock
        let mut registrations = self.registrations.write().await;
        let Some(registration) = registrations
            .iter_mut()
            .find(|r| r.id == id && r.status == RegistrationStatus::Pending)
        else {
            return Ok(None);
        };
        registration.complete(payment_id, order_id);
        Ok(Some(registration.clone()))
    }

    async fn delete_registration(&self, id: &str) -> StoreResult<bool> {
        let mut registrations = self.registrations.write().await;
        let before = registrations.len();
        registrations.retain(|r| r.id != id);
        Ok(registrations.len() < before)
    }

    async fn clear_registrations(&self) -> StoreResult<u64> {
        let mut registrations = self.registrations.write().await;
        let count = registrations.len() as u64;
        registrations.clear();
        Ok(count)
    }
}

#[async_trait]
impl MeetingLinkStore for MemoryStore {
    async fn insert_meeting_link(&self, link: &MeetingLink) -> StoreResult<()> {
        self.meeting_links.write().await.push(link.clone());
        Ok(())
    }

    async fn get_meeting_link(&self, id: &str) -> StoreResult<Option<MeetingLink>> {
        let links = self.meeting_links.read().await;
        Ok(links.iter().find(|l| l.id == id).cloned())
    }

    async fn list_meeting_links(&self, active_only: bool) -> StoreResult<Vec<MeetingLink>> {
        let links = self.meeting_links.read().await;
        Ok(links
            .iter()
            .rev()
            .filter(|l| !active_only || l.is_active)
            .cloned()
            .collect())
    }

    async fn replace_meeting_link(&self, link: &MeetingLink) -> StoreResult<bool> {
        let mut links = self.meeting_links.write().await;
        Ok(replace_by_id(&mut links, &link.id, |l| l.id.as_str(), link))
    }

    async fn delete_meeting_link(&self, id: &str) -> StoreResult<bool> {
        let mut links = self.meeting_links.write().await;
        let before = links.len();
        links.retain(|l| l.id != id);
        Ok(links.len() < before)
    }
}

#[async_trait]
impl AdminStore for MemoryStore {
    async fn insert_admin(&self, user: &AdminUser) -> StoreResult<()> {
        let mut admins = self.admins.write().await;
        if admins.iter().any(|a| a.email == user.email) {
            return Err(StoreError::Query(format!("duplicate admin email {}", user.email)));
        }
        admins.push(user.clone());
        Ok(())
    }

    async fn get_admin(&self, id: &str) -> StoreResult<Option<AdminUser>> {
        let admins = self.admins.read().await;
        Ok(admins.iter().find(|a| a.id == id).cloned())
    }

    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<AdminUser>> {
        let admins = self.admins.read().await;
        Ok(admins.iter().find(|a| a.email == email).cloned())
    }

    async fn find_admin_by_reset_hash(&self, token_hash: &str) -> StoreResult<Option<AdminUser>> {
        let now = Utc::now();
        let admins = self.admins.read().await;
        Ok(admins
            .iter()
            .find(|a| {
                a.reset_token_hash.as_deref() == Some(token_hash)
                    && a.reset_expires_at.is_some_and(|exp| exp > now)
            })
            .cloned())
    }

    async fn replace_admin(&self, user: &AdminUser) -> StoreResult<bool> {
        let mut admins = self.admins.write().await;
        Ok(replace_by_id(&mut admins, &user.id, |a| a.id.as_str(), user))
    }
}

impl Store for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(name: &str) -> Registration {
        Registration::new(name, "a@x.com", "9999999999", "live-workshops", 29900)
    }

    #[tokio::test]
    async fn test_listing_is_newest_first() {
        let store = MemoryStore::new();
        for i in 1..=25 {
            store
                .insert_registration(&registration(&format!("r{:02}", i)))
                .await
                .unwrap();
        }

        let page = store.list_registrations(PageRequest::new(2, 10)).await.unwrap();
        let names: Vec<_> = page.iter().map(|r| r.name.as_str()).collect();

        assert_eq!(names.first(), Some(&"r15"));
        assert_eq!(names.last(), Some(&"r06"));
        assert_eq!(names.len(), 10);
    }

    #[tokio::test]
    async fn test_find_by_email_ignores_case() {
        let store = MemoryStore::new();
        let r = Registration::new("A", "Foo@Bar.com", "1", "live-workshops", 29900);
        store.insert_registration(&r).await.unwrap();
        store.insert_registration(&registration("B")).await.unwrap();

        for query in ["foo@bar.com", "FOO@bar.com", "  Foo@Bar.COM "] {
            let hits = store.find_registrations_by_email(query).await.unwrap();
            assert_eq!(hits.len(), 1, "{query}");
            assert_eq!(hits[0].id, r.id);
        }
        assert!(store.find_registrations_by_email("bar@foo.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_page_far_past_the_end_is_empty() {
        let store = MemoryStore::new();
        store.insert_registration(&registration("A")).await.unwrap();

        let page = PageRequest::parse(Some("18446744073709551615"), Some("10"));
        assert!(store.list_registrations(page).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stale_replace_cannot_undo_completion() {
        let store = MemoryStore::new();
        let r = registration("A");
        store.insert_registration(&r).await.unwrap();

        // Admin reads the pending record, then the payment lands
        let mut snapshot = store.get_registration(&r.id).await.unwrap().unwrap();
        let expected = snapshot.revision();
        store.complete_payment(&r.id, "pay_1", "order_1").await.unwrap();

        snapshot.name = "Renamed".into();
        assert!(!store.replace_registration(&snapshot, expected).await.unwrap());

        let stored = store.get_registration(&r.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RegistrationStatus::Completed);
        assert_eq!(stored.payment_id.as_deref(), Some("pay_1"));
        assert_eq!(stored.name, "A");
    }

    #[tokio::test]
    async fn test_replace_with_current_revision() {
        let store = MemoryStore::new();
        let r = registration("A");
        store.insert_registration(&r).await.unwrap();

        let mut renamed = r.clone();
        renamed.name = "B".into();
        assert!(store.replace_registration(&renamed, r.revision()).await.unwrap());
        assert_eq!(store.get_registration(&r.id).await.unwrap().unwrap().name, "B");

        let mut gone = registration("C");
        gone.name = "D".into();
        assert!(!store.replace_registration(&gone, gone.revision()).await.unwrap());
    }

    #[tokio::test]
    async fn test_complete_payment_only_once() {
        let store = MemoryStore::new();
        let r = registration("A");
        store.insert_registration(&r).await.unwrap();

        let first = store.complete_payment(&r.id, "pay_1", "order_1").await.unwrap();
        let second = store.complete_payment(&r.id, "pay_2", "order_1").await.unwrap();

        let completed = first.unwrap();
        assert_eq!(completed.status, RegistrationStatus::Completed);
        assert_eq!(completed.payment_id.as_deref(), Some("pay_1"));
        assert!(second.is_none());

        let stored = store.get_registration(&r.id).await.unwrap().unwrap();
        assert_eq!(stored.payment_id.as_deref(), Some("pay_1"));
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let store = MemoryStore::new();
        let a = registration("A");
        store.insert_registration(&a).await.unwrap();
        store.insert_registration(&registration("B")).await.unwrap();

        assert!(store.delete_registration(&a.id).await.unwrap());
        assert!(!store.delete_registration(&a.id).await.unwrap());
        assert_eq!(store.clear_registrations().await.unwrap(), 1);
        assert_eq!(store.count_registrations().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_admin_email_rejected() {
        let store = MemoryStore::new();
        store
            .insert_admin(&AdminUser::new("admin@x.com", "hash".into()))
            .await
            .unwrap();

        let err = store
            .insert_admin(&AdminUser::new("admin@x.com", "hash".into()))
            .await;
        assert!(matches!(err, Err(StoreError::Query(_))));
    }
}
