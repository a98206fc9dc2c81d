//! Issues and discussions attached to a dataset.
//!
//! Both share one shape and live in separate tables; [`ThreadKind`] selects
//! which one a query targets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThreadKind {
    Issue,
    Discussion,
}

impl ThreadKind {
    pub fn table(self) -> &'static str {
        match self {
            Self::Issue => "issues",
            Self::Discussion => "discussions",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Message {
    pub content: String,
    pub posted_by: Uuid,
    pub posted_on: DateTime<Utc>,
}

/// An issue or a discussion.
#[derive(Serialize, Clone, FromRow, Debug)]
pub struct Thread {
    pub id: Uuid,

    /// The dataset this thread is about.
    pub subject_id: Uuid,

    /// Author.
    pub user_id: Uuid,

    pub title: String,
    pub messages: Json<Vec<Message>>,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub closed_by: Option<Uuid>,
}
