//! # Meeting Links
//!
//! Per-course (or general) session URLs managed from the admin panel and
//! embedded in confirmation emails.
//!
//! A link targets either one catalog course or, for general sessions, carries
//! a free-text title. The two shapes share one entity with a `kind`
//! discriminator.

use crate::catalog::CourseCatalog;
use crate::error::{AcademyError, AcademyResult};
use crate::store::StoreHandle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// What a meeting link is for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MeetingTarget {
    /// Session for one catalog course
    Course { course: String },
    /// Session not bound to a course
    General { title: String },
}

impl MeetingTarget {
    pub fn course(&self) -> Option<&str> {
        match self {
            MeetingTarget::Course { course } => Some(course),
            MeetingTarget::General { .. } => None,
        }
    }
}

/// A stored meeting link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingLink {
    pub id: String,
    #[serde(flatten)]
    pub target: MeetingTarget,
    /// Join URL
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Session date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MeetingLink {
    /// Heading used in emails
    pub fn heading(&self, catalog: &CourseCatalog) -> String {
        match &self.target {
            MeetingTarget::Course { course } => catalog.lookup(course).name.clone(),
            MeetingTarget::General { title } => title.clone(),
        }
    }

    fn validate(&self, catalog: &CourseCatalog) -> AcademyResult<()> {
        if self.link.trim().is_empty() {
            return Err(AcademyError::validation("Meeting link URL is required"));
        }
        match &self.target {
            MeetingTarget::Course { course } if !catalog.contains(course) => Err(
                AcademyError::validation(format!("Unknown course: {course}")),
            ),
            MeetingTarget::General { title } if title.trim().is_empty() => {
                Err(AcademyError::validation("Title is required"))
            }
            _ => Ok(()),
        }
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Create request. Exactly one of `course` / `title` picks the target.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewMeetingLink {
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

fn target_from(course: Option<String>, title: Option<String>) -> AcademyResult<Option<MeetingTarget>> {
    match (trimmed(course), trimmed(title)) {
        (Some(_), Some(_)) => Err(AcademyError::validation(
            "Provide either a course or a title, not both",
        )),
        (Some(course), None) => Ok(Some(MeetingTarget::Course { course })),
        (None, Some(title)) => Ok(Some(MeetingTarget::General { title })),
        (None, None) => Ok(None),
    }
}

/// Partial update. Setting `course` or `title` switches the target.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeetingLinkPatch {
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Listing filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkFilter {
    #[default]
    All,
    ActiveOnly,
}

/// Pick the link to email for `course` from an active, newest-first list:
/// the newest course-specific link, else the newest general link.
pub fn select_link_for_course<'a>(links: &'a [MeetingLink], course: &str) -> Option<&'a MeetingLink> {
    let active = || links.iter().filter(|l| l.is_active);
    active()
        .find(|l| l.target.course() == Some(course))
        .or_else(|| active().find(|l| matches!(l.target, MeetingTarget::General { .. })))
}

/// Meeting link CRUD service
#[derive(Clone)]
pub struct MeetingLinkRegistry {
    store: StoreHandle,
    catalog: Arc<CourseCatalog>,
}

impl MeetingLinkRegistry {
    pub fn new(store: StoreHandle, catalog: Arc<CourseCatalog>) -> Self {
        Self { store, catalog }
    }

    pub async fn list(&self, filter: LinkFilter) -> AcademyResult<Vec<MeetingLink>> {
        let store = self.store.require()?;
        Ok(store
            .list_meeting_links(filter == LinkFilter::ActiveOnly)
            .await?)
    }

    #[instrument(skip(self, request))]
    pub async fn create(&self, request: NewMeetingLink) -> AcademyResult<MeetingLink> {
        let target = target_from(request.course, request.title)?
            .ok_or_else(|| AcademyError::validation("Either a course or a title is required"))?;

        let now = Utc::now();
        let link = MeetingLink {
            id: Uuid::new_v4().simple().to_string(),
            target,
            link: request.link.unwrap_or_default().trim().to_string(),
            description: trimmed(request.description),
            date: request.date,
            is_active: request.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        link.validate(&self.catalog)?;

        let store = self.store.require()?;
        store.insert_meeting_link(&link).await?;

        info!("Created meeting link {} ({:?})", link.id, link.target);
        Ok(link)
    }

    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: &str, patch: MeetingLinkPatch) -> AcademyResult<MeetingLink> {
        let store = self.store.require()?;
        let mut link = store
            .get_meeting_link(id)
            .await?
            .ok_or_else(|| AcademyError::not_found("Meeting link", id))?;

        if let Some(target) = target_from(patch.course, patch.title)? {
            link.target = target;
        }
        if let Some(url) = patch.link {
            link.link = url.trim().to_string();
        }
        if patch.description.is_some() {
            link.description = trimmed(patch.description);
        }
        if patch.date.is_some() {
            link.date = patch.date;
        }
        if let Some(active) = patch.is_active {
            link.is_active = active;
        }
        link.updated_at = Utc::now();
        link.validate(&self.catalog)?;

        if !store.replace_meeting_link(&link).await? {
            return Err(AcademyError::not_found("Meeting link", id));
        }
        Ok(link)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> AcademyResult<()> {
        let store = self.store.require()?;
        if store.delete_meeting_link(id).await? {
            info!("Deleted meeting link {}", id);
            Ok(())
        } else {
            Err(AcademyError::not_found("Meeting link", id))
        }
    }

    /// The link a confirmation email for `course` should carry
    pub async fn link_for_course(&self, course: &str) -> AcademyResult<Option<MeetingLink>> {
        let links = self.list(LinkFilter::ActiveOnly).await?;
        Ok(select_link_for_course(&links, course).cloned())
    }
}
