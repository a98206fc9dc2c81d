//! Catalog entities read by the organization views.
//!
//! These map to SQLite tables via `sqlx::FromRow` and serialize as JSON page
//! contexts via `serde`.

pub mod dataset;
pub mod discussion;
pub mod follow;
pub mod organization;
pub mod page;
pub mod reuse;
pub mod user;
