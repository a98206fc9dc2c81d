//! src/services/catalog_service.rs
//!
//! CatalogService — read access to the catalog entities the organization
//! views need. Metadata lives in SQLite; every query here is scoped to a
//! single organization or user.

use crate::models::{
    dataset::Dataset,
    discussion::{Thread, ThreadKind},
    follow::Follower,
    organization::{Membership, Organization, OrganizationRef},
    page::Page,
    reuse::Reuse,
    user::{User, UserRef},
};
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, SqlitePool, sqlite::Sqlite, sqlite::SqliteRow};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

pub(crate) const ORGANIZATION_COLUMNS: &str =
    "id, name, slug, acronym, description, url, metrics, created_at, last_modified, deleted_at";
pub(crate) const DATASET_COLUMNS: &str = "id, organization_id, title, slug, description, license, \
     frequency, tags, private, created_at, last_modified, deleted_at";
const REUSE_COLUMNS: &str =
    "id, organization_id, title, slug, url, reuse_type, private, created_at, deleted_at";
const THREAD_COLUMNS: &str =
    "id, subject_id, user_id, title, messages, created_at, closed_at, closed_by";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("organization `{0}` not found")]
    OrganizationNotFound(String),
    #[error("unsupported sort `{0}`")]
    InvalidSort(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Visibility filter for content owned by an organization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    /// Public and not deleted.
    Visible,
    /// Private or deleted.
    Hidden,
}

impl Visibility {
    fn clause(self) -> &'static str {
        match self {
            Self::Visible => " AND private = 0 AND deleted_at IS NULL",
            Self::Hidden => " AND (private = 1 OR deleted_at IS NOT NULL)",
        }
    }
}

/// CatalogService is the data-access layer of the organization views:
/// - resolve organizations and users
/// - list datasets and reuses owned by an organization, filtered by visibility
/// - list followers, issues and discussions
#[derive(Clone)]
pub struct CatalogService {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
}

impl CatalogService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Resolve an organization from a URL identifier.
    ///
    /// Slugs are tried first, then ids. Deleted organizations are returned too;
    /// callers decide what to do with them.
    pub async fn find_organization(&self, ident: &str) -> CatalogResult<Organization> {
        let by_slug = format!("SELECT {ORGANIZATION_COLUMNS} FROM organizations WHERE slug = ?");
        if let Some(org) = sqlx::query_as::<_, Organization>(&by_slug)
            .bind(ident)
            .fetch_optional(&*self.db)
            .await?
        {
            return Ok(org);
        }

        if let Ok(id) = Uuid::parse_str(ident) {
            let by_id = format!("SELECT {ORGANIZATION_COLUMNS} FROM organizations WHERE id = ?");
            if let Some(org) = sqlx::query_as::<_, Organization>(&by_id)
                .bind(id)
                .fetch_optional(&*self.db)
                .await?
            {
                return Ok(org);
            }
        }

        Err(CatalogError::OrganizationNotFound(ident.to_string()))
    }

    /// Look up the user owning an API key.
    pub async fn user_by_api_key(&self, api_key: &str) -> CatalogResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, slug, first_name, last_name, email, sysadmin
             FROM users WHERE api_key = ?",
        )
        .bind(api_key)
        .fetch_optional(&*self.db)
        .await?;
        Ok(user)
    }

    /// Every organization a user is a member of, with the user's role.
    ///
    /// Deleted organizations are included so members keep their access to them.
    pub async fn user_organizations(&self, user_id: Uuid) -> CatalogResult<Vec<Membership>> {
        let memberships = sqlx::query_as::<_, Membership>(
            "SELECT m.organization_id, o.slug, o.name, m.role
             FROM members m JOIN organizations o ON o.id = m.organization_id
             WHERE m.user_id = ?
             ORDER BY o.name ASC",
        )
        .bind(user_id)
        .fetch_all(&*self.db)
        .await?;
        Ok(memberships)
    }

    /// One page of an organization's datasets, newest first.
    pub async fn datasets_page(
        &self,
        organization_id: Uuid,
        visibility: Visibility,
        page: u32,
        page_size: u32,
    ) -> CatalogResult<Page<Dataset>> {
        self.owned_page("datasets", DATASET_COLUMNS, organization_id, visibility, page, page_size)
            .await
    }

    /// All of an organization's datasets matching a visibility filter, newest first.
    pub async fn datasets(
        &self,
        organization_id: Uuid,
        visibility: Visibility,
    ) -> CatalogResult<Vec<Dataset>> {
        self.owned_by("datasets", DATASET_COLUMNS, organization_id, Some(visibility), None)
            .await
    }

    /// Every dataset of an organization regardless of visibility, oldest first.
    pub async fn all_datasets(&self, organization_id: Uuid) -> CatalogResult<Vec<Dataset>> {
        let sql = format!(
            "SELECT {DATASET_COLUMNS} FROM datasets
             WHERE organization_id = ? ORDER BY created_at ASC, id ASC"
        );
        let datasets = sqlx::query_as::<_, Dataset>(&sql)
            .bind(organization_id)
            .fetch_all(&*self.db)
            .await?;
        Ok(datasets)
    }

    /// One page of an organization's reuses, newest first.
    pub async fn reuses_page(
        &self,
        organization_id: Uuid,
        visibility: Visibility,
        page: u32,
        page_size: u32,
    ) -> CatalogResult<Page<Reuse>> {
        self.owned_page("reuses", REUSE_COLUMNS, organization_id, visibility, page, page_size)
            .await
    }

    /// All of an organization's reuses matching a visibility filter, newest first.
    pub async fn reuses(
        &self,
        organization_id: Uuid,
        visibility: Visibility,
    ) -> CatalogResult<Vec<Reuse>> {
        self.owned_by("reuses", REUSE_COLUMNS, organization_id, Some(visibility), None)
            .await
    }

    /// Active followers of an organization, ordered by follower full name.
    pub async fn followers(&self, organization_id: Uuid) -> CatalogResult<Vec<Follower>> {
        let rows = sqlx::query_as::<_, (Uuid, DateTime<Utc>, Uuid, String, String)>(
            "SELECT f.id, f.created_at, u.id, u.slug, u.first_name || ' ' || u.last_name AS fullname
             FROM follows f JOIN users u ON u.id = f.follower_id
             WHERE f.following_id = ? AND f.until IS NULL
             ORDER BY fullname ASC, u.id ASC",
        )
        .bind(organization_id)
        .fetch_all(&*self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, since, user_id, slug, fullname)| Follower {
                id,
                since,
                follower: UserRef {
                    id: user_id,
                    slug,
                    fullname,
                },
            })
            .collect())
    }

    /// Issues or discussions about one dataset, oldest first.
    pub async fn threads(&self, kind: ThreadKind, subject_id: Uuid) -> CatalogResult<Vec<Thread>> {
        let sql = format!(
            "SELECT {THREAD_COLUMNS} FROM {} WHERE subject_id = ? ORDER BY created_at ASC, id ASC",
            kind.table()
        );
        let threads = sqlx::query_as::<_, Thread>(&sql)
            .bind(subject_id)
            .fetch_all(&*self.db)
            .await?;
        Ok(threads)
    }

    /// Ids and slugs of every non-deleted organization.
    pub async fn visible_organizations(&self) -> CatalogResult<Vec<OrganizationRef>> {
        let orgs = sqlx::query_as::<_, OrganizationRef>(
            "SELECT id, slug FROM organizations WHERE deleted_at IS NULL ORDER BY slug ASC",
        )
        .fetch_all(&*self.db)
        .await?;
        Ok(orgs)
    }

    async fn owned_page<T>(
        &self,
        table: &str,
        columns: &str,
        organization_id: Uuid,
        visibility: Visibility,
        page: u32,
        page_size: u32,
    ) -> CatalogResult<Page<T>>
    where
        T: for<'r> sqlx::FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let mut count = QueryBuilder::<Sqlite>::new(format!(
            "SELECT COUNT(*) FROM {table} WHERE organization_id = "
        ));
        count.push_bind(organization_id);
        count.push(visibility.clause());
        let total: i64 = count.build_query_scalar().fetch_one(&*self.db).await?;

        let items = self
            .owned_by(
                table,
                columns,
                organization_id,
                Some(visibility),
                Some((page, page_size)),
            )
            .await?;
        debug!(table, %organization_id, total, page, "fetched owned page");

        Ok(Page::new(items, page, page_size, total.max(0) as u64))
    }

    async fn owned_by<T>(
        &self,
        table: &str,
        columns: &str,
        organization_id: Uuid,
        visibility: Option<Visibility>,
        page: Option<(u32, u32)>,
    ) -> CatalogResult<Vec<T>>
    where
        T: for<'r> sqlx::FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {columns} FROM {table} WHERE organization_id = "
        ));
        builder.push_bind(organization_id);
        if let Some(visibility) = visibility {
            builder.push(visibility.clause());
        }
        builder.push(" ORDER BY created_at DESC, id ASC");
        if let Some((page, page_size)) = page {
            builder.push(" LIMIT ");
            builder.push_bind(i64::from(page_size));
            builder.push(" OFFSET ");
            builder.push_bind(Page::<T>::offset(page, page_size));
        }

        let rows = builder.build_query_as::<T>().fetch_all(&*self.db).await?;
        Ok(rows)
    }
}
