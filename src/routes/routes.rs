//! Defines routes for the organization section of the catalog.
//!
//! ## Structure
//! - **Listing & pages**
//!   - `GET /organizations/` — search organizations
//!   - `GET /organizations/{org}/` — organization page
//!   - `GET /organizations/{org}/dashboard/` — metrics dashboard
//!
//! - **Exports** (streamed CSV attachments)
//!   - `GET /organizations/{org}/datasets.csv`
//!   - `GET /organizations/{org}/datasets-resources.csv`
//!   - `GET /organizations/{org}/issues.csv`
//!   - `GET /organizations/{org}/discussions.csv`
//!
//! - **Site**
//!   - `GET /sitemap.xml`, `GET /healthz`, `GET /readyz`
//!
//! `{org}` accepts either the organization slug or its id.

use crate::{
    handlers::{
        export_handlers::{datasets_csv, datasets_resources_csv, discussions_csv, issues_csv},
        health_handlers::{healthz, readyz},
        organization_handlers::{list_organizations, organization_dashboard, show_organization},
        sitemap_handlers::sitemap_xml,
    },
    request_user::load_request_user,
    state::AppState,
};
use axum::{Router, middleware, routing::get};
use tower_http::trace::TraceLayer;

/// Build the application router.
///
/// Every request goes through the request-user middleware before reaching
/// its handler; the router carries `AppState` to all handlers.
pub fn routes(state: AppState) -> Router {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/sitemap.xml", get(sitemap_xml))
        // Organization pages
        .route("/organizations/", get(list_organizations))
        .route("/organizations/{org}/", get(show_organization))
        .route("/organizations/{org}/dashboard/", get(organization_dashboard))
        // Exports
        .route("/organizations/{org}/datasets.csv", get(datasets_csv))
        .route(
            "/organizations/{org}/datasets-resources.csv",
            get(datasets_resources_csv),
        )
        .route("/organizations/{org}/issues.csv", get(issues_csv))
        .route("/organizations/{org}/discussions.csv", get(discussions_csv))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            load_request_user,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
