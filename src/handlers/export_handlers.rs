//! CSV exports of an organization's datasets, resources, issues and discussions.

use crate::{
    errors::AppError,
    models::discussion::ThreadKind,
    services::csv_export::{
        self, DatasetCsvAdapter, IssuesOrDiscussionCsvAdapter, ResourcesCsvAdapter,
    },
    state::AppState,
};
use axum::{
    extract::{Path, State},
    response::Response,
};
use tracing::info;

/// `GET /organizations/{org}/datasets.csv`
pub async fn datasets_csv(
    State(state): State<AppState>,
    Path(ident): Path<String>,
) -> Result<Response, AppError> {
    let org = state.catalog.find_organization(&ident).await?;
    let datasets = state.search.iter_datasets(org.id).await?;
    info!(org = %org.slug, datasets = datasets.len(), "exporting datasets");

    let adapter = DatasetCsvAdapter::new(datasets, state.config.site_url.as_str());
    csv_export::stream(adapter, &format!("{}-datasets", org.slug))
}

/// `GET /organizations/{org}/datasets-resources.csv`
pub async fn datasets_resources_csv(
    State(state): State<AppState>,
    Path(ident): Path<String>,
) -> Result<Response, AppError> {
    let org = state.catalog.find_organization(&ident).await?;
    let datasets = state.search.iter_datasets(org.id).await?;
    info!(org = %org.slug, datasets = datasets.len(), "exporting dataset resources");

    let adapter = ResourcesCsvAdapter::new(datasets, state.config.site_url.as_str());
    csv_export::stream(adapter, &format!("{}-datasets-resources", org.slug))
}

/// `GET /organizations/{org}/issues.csv`
pub async fn issues_csv(
    State(state): State<AppState>,
    Path(ident): Path<String>,
) -> Result<Response, AppError> {
    threads_csv(&state, &ident, ThreadKind::Issue, "issues").await
}

/// `GET /organizations/{org}/discussions.csv`
pub async fn discussions_csv(
    State(state): State<AppState>,
    Path(ident): Path<String>,
) -> Result<Response, AppError> {
    threads_csv(&state, &ident, ThreadKind::Discussion, "discussions").await
}

/// Threads of every dataset the organization owns, whatever its visibility,
/// flattened in dataset order.
async fn threads_csv(
    state: &AppState,
    ident: &str,
    kind: ThreadKind,
    suffix: &str,
) -> Result<Response, AppError> {
    let org = state.catalog.find_organization(ident).await?;
    let datasets = state.catalog.all_datasets(org.id).await?;

    let mut per_dataset = Vec::with_capacity(datasets.len());
    for dataset in &datasets {
        per_dataset.push(state.catalog.threads(kind, dataset.id).await?);
    }
    info!(
        org = %org.slug,
        kind = kind.table(),
        datasets = datasets.len(),
        "exporting threads"
    );

    let adapter = IssuesOrDiscussionCsvAdapter::new(per_dataset.into_iter().flatten());
    csv_export::stream(adapter, &format!("{}-{}", org.slug, suffix))
}
