//! Organizations and their memberships.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use std::collections::HashMap;
use uuid::Uuid;

/// A catalog organization, owner of datasets and reuses.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Organization {
    pub id: Uuid,

    pub name: String,

    /// Unique URL identifier.
    pub slug: String,

    pub acronym: Option<String>,

    pub description: String,

    /// Organization website, if any.
    pub url: Option<String>,

    /// Aggregated counters (`datasets`, `reuses`, `followers`, ...).
    pub metrics: Json<HashMap<String, i64>>,

    pub created_at: DateTime<Utc>,

    pub last_modified: DateTime<Utc>,

    /// Set when the organization has been soft-deleted.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Organization {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Read a metrics counter, absent counters being zero.
    pub fn metric(&self, name: &str) -> i64 {
        self.metrics.0.get(name).copied().unwrap_or(0)
    }
}

/// Minimal projection used by the sitemap.
#[derive(Serialize, Clone, FromRow, Debug)]
pub struct OrganizationRef {
    pub id: Uuid,
    pub slug: String,
}

/// Role held by a user inside an organization.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MemberRole {
    Admin,
    Editor,
}

/// An organization the current user belongs to, with the user's role in it.
#[derive(Serialize, Clone, FromRow, Debug)]
pub struct Membership {
    pub organization_id: Uuid,
    pub slug: String,
    pub name: String,
    pub role: MemberRole,
}
