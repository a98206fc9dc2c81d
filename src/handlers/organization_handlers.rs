//! Organization pages: listing, detail and dashboard.
//!
//! Each handler returns the page context as JSON; rendering is left to the
//! front end.

use crate::{
    errors::AppError,
    models::{
        dataset::Dataset,
        follow::Follower,
        organization::{Membership, Organization},
        page::Page,
        reuse::Reuse,
    },
    permissions::OrgPermissions,
    request_user::RequestUser,
    services::{
        catalog_service::Visibility,
        search_service::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, OrganizationQuery},
    },
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Datasets and reuses shown on the detail page.
pub const DETAIL_PAGE_SIZE: u32 = 9;

#[derive(Debug, Deserialize)]
pub struct OrganizationListQuery {
    pub q: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub sort: Option<String>,
}

#[derive(Serialize)]
pub struct OrganizationListContext {
    pub organizations: Page<Organization>,
    pub user_organizations: Vec<Membership>,
}

#[derive(Serialize)]
pub struct OrganizationDetailContext {
    pub org: Organization,
    #[serde(flatten)]
    pub permissions: OrgPermissions,
    pub datasets: Page<Dataset>,
    pub reuses: Page<Reuse>,
    pub followers: Vec<Follower>,
    pub private_datasets: Vec<Dataset>,
    pub private_reuses: Vec<Reuse>,
}

#[derive(Serialize)]
pub struct DashboardContext {
    pub org: Organization,
    #[serde(flatten)]
    pub permissions: OrgPermissions,
    pub metrics: Vec<WidgetGroup>,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Line,
    Bar,
}

/// A titled row of dashboard charts.
#[derive(Serialize, Debug, PartialEq)]
pub struct WidgetGroup {
    pub title: &'static str,
    pub widgets: Vec<Widget>,
}

/// One chart: the metric it plots and where it links to.
#[derive(Serialize, Debug, PartialEq)]
pub struct Widget {
    pub title: &'static str,
    pub metric: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<&'static str>,
    #[serde(rename = "type")]
    pub chart: ChartType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<WidgetArgs>,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct WidgetArgs {
    pub org: String,
}

/// `GET /organizations/`
pub async fn list_organizations(
    State(state): State<AppState>,
    Extension(current): Extension<RequestUser>,
    params: Result<Query<OrganizationListQuery>, QueryRejection>,
) -> Result<Json<OrganizationListContext>, AppError> {
    let Query(params) =
        params.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    let query = OrganizationQuery {
        q: params.q,
        sort: params.sort.as_deref().unwrap_or("name").parse()?,
        page: params.page.unwrap_or(1).max(1),
        page_size: params
            .page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE),
    };

    let organizations = state.search.search_organizations(&query).await?;
    debug!(
        total = organizations.total,
        page = query.page,
        "listed organizations"
    );

    let user_organizations = if current.is_authenticated() {
        current.organizations
    } else {
        Vec::new()
    };

    Ok(Json(OrganizationListContext {
        organizations,
        user_organizations,
    }))
}

/// `GET /organizations/{org}/`
///
/// Deleted organizations are gone (410) for everyone but their members.
pub async fn show_organization(
    State(state): State<AppState>,
    Extension(current): Extension<RequestUser>,
    Path(ident): Path<String>,
) -> Result<Response, AppError> {
    let org = state.catalog.find_organization(&ident).await?;
    if org.slug != ident {
        return Ok(moved_permanently(format!("/organizations/{}/", org.slug)));
    }

    let permissions = OrgPermissions::evaluate(&current, &org);
    if org.is_deleted() && !permissions.can_view {
        info!(org = %org.slug, "refusing access to deleted organization");
        return Err(AppError::gone(format!(
            "organization `{}` has been deleted",
            org.slug
        )));
    }

    let catalog = &state.catalog;
    let datasets = catalog
        .datasets_page(org.id, Visibility::Visible, 1, DETAIL_PAGE_SIZE)
        .await?;
    let reuses = catalog
        .reuses_page(org.id, Visibility::Visible, 1, DETAIL_PAGE_SIZE)
        .await?;
    let followers = catalog.followers(org.id).await?;

    let (private_datasets, private_reuses) = if permissions.can_view {
        (
            catalog.datasets(org.id, Visibility::Hidden).await?,
            catalog.reuses(org.id, Visibility::Hidden).await?,
        )
    } else {
        (Vec::new(), Vec::new())
    };

    Ok(Json(OrganizationDetailContext {
        org,
        permissions,
        datasets,
        reuses,
        followers,
        private_datasets,
        private_reuses,
    })
    .into_response())
}

/// `GET /organizations/{org}/dashboard/`
pub async fn organization_dashboard(
    State(state): State<AppState>,
    Extension(current): Extension<RequestUser>,
    Path(ident): Path<String>,
) -> Result<Response, AppError> {
    let org = state.catalog.find_organization(&ident).await?;
    if org.slug != ident {
        return Ok(moved_permanently(format!(
            "/organizations/{}/dashboard/",
            org.slug
        )));
    }

    let permissions = OrgPermissions::evaluate(&current, &org);
    let metrics = dashboard_widgets(&org);

    Ok(Json(DashboardContext {
        org,
        permissions,
        metrics,
    })
    .into_response())
}

/// Dataset and reuse charts only appear once the organization has some;
/// the community group is always there.
pub fn dashboard_widgets(org: &Organization) -> Vec<WidgetGroup> {
    let mut groups = Vec::new();
    let args = || {
        Some(WidgetArgs {
            org: org.slug.clone(),
        })
    };

    if org.metric("datasets") > 0 {
        groups.push(WidgetGroup {
            title: "Datasets",
            widgets: vec![
                Widget {
                    title: "Datasets",
                    metric: "datasets",
                    data: None,
                    chart: ChartType::Line,
                    endpoint: Some("datasets.list"),
                    args: args(),
                },
                Widget {
                    title: "Views",
                    metric: "dataset_views",
                    data: Some("datasets_nb_uniq_visitors"),
                    chart: ChartType::Bar,
                    endpoint: Some("datasets.list"),
                    args: args(),
                },
            ],
        });
    }

    if org.metric("reuses") > 0 {
        groups.push(WidgetGroup {
            title: "Reuses",
            widgets: vec![
                Widget {
                    title: "Reuses",
                    metric: "reuses",
                    data: None,
                    chart: ChartType::Line,
                    endpoint: Some("reuses.list"),
                    args: args(),
                },
                Widget {
                    title: "Views",
                    metric: "reuse_views",
                    data: Some("reuses_nb_uniq_visitors"),
                    chart: ChartType::Bar,
                    endpoint: Some("reuses.list"),
                    args: args(),
                },
            ],
        });
    }

    groups.push(WidgetGroup {
        title: "Community",
        widgets: vec![
            Widget {
                title: "Permitted reuses",
                metric: "permitted_reuses",
                data: None,
                chart: ChartType::Line,
                endpoint: None,
                args: None,
            },
            Widget {
                title: "Followers",
                metric: "followers",
                data: None,
                chart: ChartType::Line,
                endpoint: None,
                args: None,
            },
        ],
    });

    groups
}

fn moved_permanently(location: String) -> Response {
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response()
}
