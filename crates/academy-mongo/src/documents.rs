//! BSON document shapes and conversions to the core types.
//!
//! Timestamps are stored as native BSON dates; ids are the string ids the
//! core types generate, kept in `_id`.

use academy_core::{AdminRole, AdminUser, MeetingLink, MeetingTarget, Registration, RegistrationStatus};
use chrono::{DateTime, Utc};
use mongodb::bson;
use serde::{Deserialize, Serialize};

pub(crate) fn to_bson_date(dt: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(dt.timestamp_millis())
}

pub(crate) fn from_bson_date(dt: bson::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(dt.timestamp_millis()).unwrap_or_default()
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct RegistrationDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    #[serde(default)]
    pub profession: Option<String>,
    pub course: String,
    pub amount: i64,
    pub status: RegistrationStatus,
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

impl From<&Registration> for RegistrationDoc {
    fn from(r: &Registration) -> Self {
        Self {
            id: r.id.clone(),
            name: r.name.clone(),
            email: r.email.clone(),
            phone_number: r.phone_number.clone(),
            profession: r.profession.clone(),
            course: r.course.clone(),
            amount: r.amount,
            status: r.status,
            payment_id: r.payment_id.clone(),
            order_id: r.order_id.clone(),
            created_at: to_bson_date(r.created_at),
            updated_at: to_bson_date(r.updated_at),
        }
    }
}

impl From<RegistrationDoc> for Registration {
    fn from(d: RegistrationDoc) -> Self {
        Self {
            id: d.id,
            name: d.name,
            email: d.email,
            phone_number: d.phone_number,
            profession: d.profession,
            course: d.course,
            amount: d.amount,
            status: d.status,
            payment_id: d.payment_id,
            order_id: d.order_id,
            created_at: from_bson_date(d.created_at),
            updated_at: from_bson_date(d.updated_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct MeetingLinkDoc {
    #[serde(rename = "_id")]
    pub id: String,
    /// `course` or `general`
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub link: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<bson::DateTime>,
    pub is_active: bool,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

impl From<&MeetingLink> for MeetingLinkDoc {
    fn from(l: &MeetingLink) -> Self {
        let (kind, course, title) = match &l.target {
            MeetingTarget::Course { course } => ("course", Some(course.clone()), None),
            MeetingTarget::General { title } => ("general", None, Some(title.clone())),
        };
        Self {
            id: l.id.clone(),
            kind: kind.to_string(),
            course,
            title,
            link: l.link.clone(),
            description: l.description.clone(),
            date: l.date.map(to_bson_date),
            is_active: l.is_active,
            created_at: to_bson_date(l.created_at),
            updated_at: to_bson_date(l.updated_at),
        }
    }
}

impl From<MeetingLinkDoc> for MeetingLink {
    fn from(d: MeetingLinkDoc) -> Self {
        // Legacy rows without a kind are course links when a course is set
        let target = match (d.kind.as_str(), d.course, d.title) {
            ("general", _, title) => MeetingTarget::General {
                title: title.unwrap_or_default(),
            },
            (_, Some(course), _) => MeetingTarget::Course { course },
            (_, None, title) => MeetingTarget::General {
                title: title.unwrap_or_default(),
            },
        };
        Self {
            id: d.id,
            target,
            link: d.link,
            description: d.description,
            date: d.date.map(from_bson_date),
            is_active: d.is_active,
            created_at: from_bson_date(d.created_at),
            updated_at: from_bson_date(d.updated_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AdminDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub role: AdminRole,
    #[serde(default)]
    pub reset_token_hash: Option<String>,
    #[serde(default)]
    pub reset_expires_at: Option<bson::DateTime>,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

impl From<&AdminUser> for AdminDoc {
    fn from(u: &AdminUser) -> Self {
        Self {
            id: u.id.clone(),
            email: u.email.clone(),
            password_hash: u.password_hash.clone(),
            role: u.role,
            reset_token_hash: u.reset_token_hash.clone(),
            reset_expires_at: u.reset_expires_at.map(to_bson_date),
            created_at: to_bson_date(u.created_at),
            updated_at: to_bson_date(u.updated_at),
        }
    }
}

impl From<AdminDoc> for AdminUser {
    fn from(d: AdminDoc) -> Self {
        Self {
            id: d.id,
            email: d.email,
            password_hash: d.password_hash,
            role: d.role,
            reset_token_hash: d.reset_token_hash,
            reset_expires_at: d.reset_expires_at.map(from_bson_date),
            created_at: from_bson_date(d.created_at),
            updated_at: from_bson_date(d.updated_at),
        }
    }
}
