use crate::{
    errors::AppError,
    services::sitemap::{render_urlset, sitemap_urls},
    state::AppState,
};
use axum::{
    extract::State,
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};

/// `GET /sitemap.xml`
pub async fn sitemap_xml(State(state): State<AppState>) -> Result<Response, AppError> {
    let entries = sitemap_urls(&state.catalog).await?;
    let xml = render_urlset(&state.config.site_url, &entries);

    let mut response = xml.into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/xml"),
    );
    Ok(response)
}
