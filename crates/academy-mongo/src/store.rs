//! # MongoDB Store
//!
//! One collection per entity: `registrations`, `meetinglinks`, `admins`.
//! Listings sort on `created_at` descending.

use crate::documents::{to_bson_date, AdminDoc, MeetingLinkDoc, RegistrationDoc};
use academy_core::{
    normalize_email, AdminStore, AdminUser, MeetingLink, MeetingLinkStore, PageRequest,
    Registration, RegistrationStatus, RegistrationStore, Revision, Store, StoreError,
    StoreResult,
};
use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Document};
use mongodb::error::ErrorKind;
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

const REGISTRATIONS: &str = "registrations";
const MEETING_LINKS: &str = "meetinglinks";
const ADMINS: &str = "admins";

fn map_err(err: mongodb::error::Error) -> StoreError {
    match err.kind.as_ref() {
        ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) => {
            StoreError::Connection(err.to_string())
        }
        ErrorKind::BsonDeserialization(_) | ErrorKind::BsonSerialization(_) => {
            StoreError::Serialization(err.to_string())
        }
        _ => StoreError::Query(err.to_string()),
    }
}

fn by_id(id: &str) -> Document {
    doc! { "_id": id }
}

/// Matches `id` only while it is still at `expected`
fn at_revision(id: &str, expected: Revision) -> Document {
    doc! {
        "_id": id,
        "status": expected.status.as_str(),
        "updated_at": to_bson_date(expected.updated_at),
    }
}

pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    /// Connect, ping, and make sure indexes exist.
    ///
    /// A failed ping is a `Connection` error so callers can fall back to
    /// demo mode.
    #[instrument(skip(uri))]
    pub async fn connect(uri: &str, database: &str) -> StoreResult<Self> {
        let client = Client::with_uri_str(uri).await.map_err(map_err)?;
        let db = client.database(database);

        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        info!("Connected to MongoDB database '{}'", database);

        let store = Self { db };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> StoreResult<()> {
        let unique_email = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.admins().create_index(unique_email).await.map_err(map_err)?;

        let newest = IndexModel::builder().keys(doc! { "created_at": -1 }).build();
        self.registrations()
            .create_index(newest)
            .await
            .map_err(map_err)?;

        let by_email = IndexModel::builder().keys(doc! { "email": 1 }).build();
        self.registrations()
            .create_index(by_email)
            .await
            .map_err(map_err)?;

        debug!("MongoDB indexes ensured");
        Ok(())
    }

    fn registrations(&self) -> Collection<RegistrationDoc> {
        self.db.collection(REGISTRATIONS)
    }

    fn meeting_links(&self) -> Collection<MeetingLinkDoc> {
        self.db.collection(MEETING_LINKS)
    }

    fn admins(&self) -> Collection<AdminDoc> {
        self.db.collection(ADMINS)
    }
}

async fn collect<D, T>(cursor: mongodb::Cursor<D>) -> StoreResult<Vec<T>>
where
    D: DeserializeOwned + Send + Sync + Unpin,
    T: From<D>,
{
    let docs: Vec<D> = cursor.try_collect().await.map_err(map_err)?;
    Ok(docs.into_iter().map(T::from).collect())
}

#[async_trait]
impl RegistrationStore for MongoStore {
    async fn insert_registration(&self, registration: &Registration) -> StoreResult<()> {
        self.registrations()
            .insert_one(RegistrationDoc::from(registration))
            .await
            .map_err(map_err)?;
        Ok(())
    }

    async fn get_registration(&self, id: &str) -> StoreResult<Option<Registration>> {
        let found = self
            .registrations()
            .find_one(by_id(id))
            .await
            .map_err(map_err)?;
        Ok(found.map(Registration::from))
    }

    async fn find_registrations_by_email(&self, email: &str) -> StoreResult<Vec<Registration>> {
        let cursor = self
            .registrations()
            .find(doc! { "email": normalize_email(email) })
            .sort(doc! { "created_at": -1, "_id": -1 })
            .await
            .map_err(map_err)?;
        collect(cursor).await
    }

    async fn list_registrations(&self, page: PageRequest) -> StoreResult<Vec<Registration>> {
        let cursor = self
            .registrations()
            .find(doc! {})
            .sort(doc! { "created_at": -1, "_id": -1 })
            .skip(page.skip())
            .limit(page.limit as i64)
            .await
            .map_err(map_err)?;
        collect(cursor).await
    }

    async fn all_registrations(&self) -> StoreResult<Vec<Registration>> {
        let cursor = self
            .registrations()
            .find(doc! {})
            .sort(doc! { "created_at": -1, "_id": -1 })
            .await
            .map_err(map_err)?;
        collect(cursor).await
    }

    async fn count_registrations(&self) -> StoreResult<u64> {
        self.registrations()
            .count_documents(doc! {})
            .await
            .map_err(map_err)
    }

    async fn replace_registration(
        &self,
        registration: &Registration,
        expected: Revision,
    ) -> StoreResult<bool> {
        let result = self
            .registrations()
            .replace_one(
                at_revision(&registration.id, expected),
                RegistrationDoc::from(registration),
            )
            .await
            .map_err(map_err)?;
        Ok(result.matched_count > 0)
    }

    async fn complete_payment(
        &self,
        id: &str,
        payment_id: &str,
        order_id: &str,
    ) -> StoreResult<Option<Registration>> {
        let filter = doc! {
            "_id": id,
            "status": RegistrationStatus::Pending.as_str(),
        };
        let update = doc! {
            "$set": {
                "status": RegistrationStatus::Completed.as_str(),
                "payment_id": payment_id,
                "order_id": order_id,
                "updated_at": to_bson_date(Utc::now()),
            }
        };

        let updated = self
            .registrations()
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_err)?;
        Ok(updated.map(Registration::from))
    }

    async fn delete_registration(&self, id: &str) -> StoreResult<bool> {
        let result = self
            .registrations()
            .delete_one(by_id(id))
            .await
            .map_err(map_err)?;
        Ok(result.deleted_count > 0)
    }

    async fn clear_registrations(&self) -> StoreResult<u64> {
        let result = self
            .registrations()
            .delete_many(doc! {})
            .await
            .map_err(map_err)?;
        Ok(result.deleted_count)
    }
}

#[async_trait]
impl MeetingLinkStore for MongoStore {
    async fn insert_meeting_link(&self, link: &MeetingLink) -> StoreResult<()> {
        self.meeting_links()
            .insert_one(MeetingLinkDoc::from(link))
            .await
            .map_err(map_err)?;
        Ok(())
    }

    async fn get_meeting_link(&self, id: &str) -> StoreResult<Option<MeetingLink>> {
        let found = self
            .meeting_links()
            .find_one(by_id(id))
            .await
            .map_err(map_err)?;
        Ok(found.map(MeetingLink::from))
    }

    async fn list_meeting_links(&self, active_only: bool) -> StoreResult<Vec<MeetingLink>> {
        let filter = if active_only {
            doc! { "is_active": true }
        } else {
            doc! {}
        };
        let cursor = self
            .meeting_links()
            .find(filter)
            .sort(doc! { "created_at": -1, "_id": -1 })
            .await
            .map_err(map_err)?;
        collect(cursor).await
    }

    async fn replace_meeting_link(&self, link: &MeetingLink) -> StoreResult<bool> {
        let result = self
            .meeting_links()
            .replace_one(by_id(&link.id), MeetingLinkDoc::from(link))
            .await
            .map_err(map_err)?;
        Ok(result.matched_count > 0)
    }

    async fn delete_meeting_link(&self, id: &str) -> StoreResult<bool> {
        let result = self
            .meeting_links()
            .delete_one(by_id(id))
            .await
            .map_err(map_err)?;
        Ok(result.deleted_count > 0)
    }
}

#[async_trait]
impl AdminStore for MongoStore {
    async fn insert_admin(&self, user: &AdminUser) -> StoreResult<()> {
        self.admins()
            .insert_one(AdminDoc::from(user))
            .await
            .map_err(map_err)?;
        Ok(())
    }

    async fn get_admin(&self, id: &str) -> StoreResult<Option<AdminUser>> {
        let found = self.admins().find_one(by_id(id)).await.map_err(map_err)?;
        Ok(found.map(AdminUser::from))
    }

    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<AdminUser>> {
        let found = self
            .admins()
            .find_one(doc! { "email": email })
            .await
            .map_err(map_err)?;
        Ok(found.map(AdminUser::from))
    }

    async fn find_admin_by_reset_hash(&self, token_hash: &str) -> StoreResult<Option<AdminUser>> {
        let filter = doc! {
            "reset_token_hash": token_hash,
            "reset_expires_at": { "$gt": bson::DateTime::now() },
        };
        let found = self.admins().find_one(filter).await.map_err(map_err)?;
        Ok(found.map(AdminUser::from))
    }

    async fn replace_admin(&self, user: &AdminUser) -> StoreResult<bool> {
        let result = self
            .admins()
            .replace_one(by_id(&user.id), AdminDoc::from(user))
            .await
            .map_err(map_err)?;
        Ok(result.matched_count > 0)
    }
}

impl Store for MongoStore {
    fn backend_name(&self) -> &'static str {
        "mongodb"
    }
}
