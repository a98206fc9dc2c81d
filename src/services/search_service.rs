//! src/services/search_service.rs
//!
//! SearchService — the public search index of the catalog. Only public
//! content is indexed: non-deleted organizations, and datasets that are
//! neither private nor deleted. Exports read datasets from here rather than
//! from the catalog so they match what visitors can find.

use crate::{
    models::{
        dataset::{Dataset, DatasetDocument, Resource},
        organization::Organization,
        page::Page,
    },
    services::catalog_service::{
        CatalogError, CatalogResult, DATASET_COLUMNS, ORGANIZATION_COLUMNS,
    },
};
use sqlx::{QueryBuilder, SqlitePool, sqlite::Sqlite};
use std::{collections::HashMap, str::FromStr, sync::Arc};
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Sort orders accepted by the organization search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OrganizationSort {
    #[default]
    Name,
    NameDesc,
    Created,
    CreatedDesc,
    Datasets,
    DatasetsDesc,
    Followers,
    FollowersDesc,
}

impl OrganizationSort {
    fn order_by(self) -> &'static str {
        match self {
            Self::Name => "name COLLATE NOCASE ASC",
            Self::NameDesc => "name COLLATE NOCASE DESC",
            Self::Created => "created_at ASC",
            Self::CreatedDesc => "created_at DESC",
            Self::Datasets => "COALESCE(json_extract(metrics, '$.datasets'), 0) ASC",
            Self::DatasetsDesc => "COALESCE(json_extract(metrics, '$.datasets'), 0) DESC",
            Self::Followers => "COALESCE(json_extract(metrics, '$.followers'), 0) ASC",
            Self::FollowersDesc => "COALESCE(json_extract(metrics, '$.followers'), 0) DESC",
        }
    }
}

impl FromStr for OrganizationSort {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "-name" => Ok(Self::NameDesc),
            "created" => Ok(Self::Created),
            "-created" => Ok(Self::CreatedDesc),
            "datasets" => Ok(Self::Datasets),
            "-datasets" => Ok(Self::DatasetsDesc),
            "followers" => Ok(Self::Followers),
            "-followers" => Ok(Self::FollowersDesc),
            other => Err(CatalogError::InvalidSort(other.to_string())),
        }
    }
}

/// A normalized organization search.
#[derive(Clone, Debug)]
pub struct OrganizationQuery {
    /// Case-insensitive match on name, acronym or slug.
    pub q: Option<String>,
    pub sort: OrganizationSort,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Clone)]
pub struct SearchService {
    pub db: Arc<SqlitePool>,
}

impl SearchService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Paginated search over visible organizations.
    pub async fn search_organizations(
        &self,
        query: &OrganizationQuery,
    ) -> CatalogResult<Page<Organization>> {
        let ids = match query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => {
                let ids = self.matching_organization_ids(q).await?;
                if ids.is_empty() {
                    return Ok(Page::new(Vec::new(), query.page, query.page_size, 0));
                }
                Some(ids)
            }
            None => None,
        };

        let mut count =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM organizations WHERE deleted_at IS NULL");
        push_id_filter(&mut count, ids.as_deref());
        let total: i64 = count.build_query_scalar().fetch_one(&*self.db).await?;

        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {ORGANIZATION_COLUMNS} FROM organizations WHERE deleted_at IS NULL"
        ));
        push_id_filter(&mut builder, ids.as_deref());
        builder.push(" ORDER BY ");
        builder.push(query.sort.order_by());
        builder.push(", id ASC LIMIT ");
        builder.push_bind(i64::from(query.page_size));
        builder.push(" OFFSET ");
        builder.push_bind(Page::<Organization>::offset(query.page, query.page_size));

        let items: Vec<Organization> = builder.build_query_as().fetch_all(&*self.db).await?;
        debug!(total, page = query.page, "organization search");

        Ok(Page::new(
            items,
            query.page,
            query.page_size,
            total.max(0) as u64,
        ))
    }

    /// Ids of visible organizations whose name, slug or acronym contains `q`.
    ///
    /// Case folding is Unicode-aware and `%` or `_` in `q` match literally.
    async fn matching_organization_ids(&self, q: &str) -> CatalogResult<Vec<Uuid>> {
        let needle = q.to_lowercase();
        let candidates = sqlx::query_as::<_, (Uuid, String, String, Option<String>)>(
            "SELECT id, name, slug, acronym FROM organizations WHERE deleted_at IS NULL",
        )
        .fetch_all(&*self.db)
        .await?;

        Ok(candidates
            .into_iter()
            .filter(|(_, name, slug, acronym)| {
                [Some(name), Some(slug), acronym.as_ref()]
                    .into_iter()
                    .flatten()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .map(|(id, ..)| id)
            .collect())
    }

    /// Every indexed dataset of an organization, with its resources.
    pub async fn iter_datasets(&self, organization_id: Uuid) -> CatalogResult<Vec<DatasetDocument>> {
        let organization: Option<String> =
            sqlx::query_scalar("SELECT name FROM organizations WHERE id = ?")
                .bind(organization_id)
                .fetch_optional(&*self.db)
                .await?;

        let sql = format!(
            "SELECT {DATASET_COLUMNS} FROM datasets
             WHERE organization_id = ? AND private = 0 AND deleted_at IS NULL
             ORDER BY created_at ASC, id ASC"
        );
        let datasets = sqlx::query_as::<_, Dataset>(&sql)
            .bind(organization_id)
            .fetch_all(&*self.db)
            .await?;

        let resources = sqlx::query_as::<_, Resource>(
            "SELECT r.id, r.dataset_id, r.title, r.description, r.url, r.filetype, r.format,
                    r.mime, r.filesize, r.created_at, r.last_modified
             FROM resources r JOIN datasets d ON d.id = r.dataset_id
             WHERE d.organization_id = ? AND d.private = 0 AND d.deleted_at IS NULL
             ORDER BY r.created_at ASC, r.id ASC",
        )
        .bind(organization_id)
        .fetch_all(&*self.db)
        .await?;

        let mut by_dataset: HashMap<Uuid, Vec<Resource>> = HashMap::new();
        for resource in resources {
            by_dataset
                .entry(resource.dataset_id)
                .or_default()
                .push(resource);
        }

        Ok(datasets
            .into_iter()
            .map(|dataset| DatasetDocument {
                resources: by_dataset.remove(&dataset.id).unwrap_or_default(),
                organization: organization.clone(),
                dataset,
            })
            .collect())
    }
}

fn push_id_filter(builder: &mut QueryBuilder<'_, Sqlite>, ids: Option<&[Uuid]>) {
    if let Some(ids) = ids {
        builder.push(" AND id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
    }
}
