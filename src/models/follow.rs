//! Follower relationships.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::user::UserRef;

/// An active follow of an organization, with its follower.
#[derive(Serialize, Clone, Debug)]
pub struct Follower {
    pub id: Uuid,
    pub since: DateTime<Utc>,
    pub follower: UserRef,
}
