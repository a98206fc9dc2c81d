//! Catalog users.

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Serialize, Clone, FromRow, Debug)]
pub struct User {
    pub id: Uuid,
    pub slug: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,

    /// Platform administrators bypass organization permissions.
    pub sysadmin: bool,
}

/// Public projection of a user, as embedded in other documents.
#[derive(Serialize, Clone, FromRow, Debug, PartialEq)]
pub struct UserRef {
    pub id: Uuid,
    pub slug: String,
    pub fullname: String,
}
