//! Datasets, their resources, and the indexed dataset document.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, types::Json};
use uuid::Uuid;

/// A dataset as stored in the catalog.
#[derive(Serialize, Clone, FromRow, Debug)]
pub struct Dataset {
    pub id: Uuid,

    /// Owning organization, if any.
    pub organization_id: Option<Uuid>,

    pub title: String,
    pub slug: String,
    pub description: String,
    pub license: Option<String>,

    /// Update frequency (e.g. "monthly").
    pub frequency: Option<String>,

    pub tags: Json<Vec<String>>,

    /// Private datasets are only shown to organization members.
    pub private: bool,

    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A downloadable file or remote link attached to a dataset.
#[derive(Serialize, Clone, FromRow, Debug)]
pub struct Resource {
    pub id: Uuid,
    pub dataset_id: Uuid,
    pub title: String,
    pub description: String,
    pub url: String,

    /// `file`, `remote`, ...
    pub filetype: String,

    pub format: Option<String>,
    pub mime: Option<String>,
    pub filesize: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

/// Dataset as exposed by the search index: denormalized with its
/// organization name and resources.
#[derive(Serialize, Clone, Debug)]
pub struct DatasetDocument {
    pub dataset: Dataset,
    pub organization: Option<String>,
    pub resources: Vec<Resource>,
}
