//! Resolves the requesting user once per request.
//!
//! The user and the organizations they belong to are cached in request
//! extensions, where handlers and permission checks read them.

use crate::{
    errors::AppError,
    models::{organization::Membership, user::User},
    state::AppState,
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

pub const API_KEY_HEADER: &str = "x-api-key";

/// The current user, if authenticated, and their organizations.
#[derive(Clone, Debug, Default)]
pub struct RequestUser {
    pub user: Option<User>,
    pub organizations: Vec<Membership>,
}

impl RequestUser {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Middleware attaching a [`RequestUser`] to every request.
pub async fn load_request_user(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let api_key = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    let mut current = RequestUser::anonymous();
    if let Some(key) = api_key {
        match state.catalog.user_by_api_key(&key).await? {
            Some(user) => {
                current.organizations = state.catalog.user_organizations(user.id).await?;
                debug!(user = %user.slug, orgs = current.organizations.len(), "authenticated request");
                current.user = Some(user);
            }
            None => debug!("unknown api key, treating request as anonymous"),
        }
    }

    req.extensions_mut().insert(current);
    Ok(next.run(req).await)
}
