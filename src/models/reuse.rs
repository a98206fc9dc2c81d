//! Reuses: recorded external uses of catalog datasets.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Serialize, Clone, FromRow, Debug)]
pub struct Reuse {
    pub id: Uuid,
    pub organization_id: Option<Uuid>,
    pub title: String,
    pub slug: String,

    /// Where the reuse lives.
    pub url: String,

    /// `application`, `visualization`, `api`, ...
    pub reuse_type: String,

    pub private: bool,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}
