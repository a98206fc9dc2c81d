//! Sitemap generation for organization pages.

use crate::services::catalog_service::{CatalogResult, CatalogService};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

pub const SHOW_ENDPOINT: &str = "organizations.show_redirect";
pub const ORGANIZATION_PRIORITY: f32 = 0.7;
pub const ORGANIZATION_CHANGEFREQ: &str = "weekly";

/// One `<url>` of the sitemap.
#[derive(Serialize, Clone, Debug)]
pub struct SitemapEntry {
    /// Route name the location was built for.
    pub endpoint: &'static str,
    /// Site-relative location.
    pub loc: String,
    pub lastmod: Option<DateTime<Utc>>,
    /// `daily`, `weekly`, ...
    pub changefreq: &'static str,
    pub priority: f32,
}

/// One entry per visible organization.
pub async fn sitemap_urls(catalog: &CatalogService) -> CatalogResult<Vec<SitemapEntry>> {
    let orgs = catalog.visible_organizations().await?;
    Ok(orgs
        .into_iter()
        .map(|org| SitemapEntry {
            endpoint: SHOW_ENDPOINT,
            loc: format!("/organizations/{}/", org.slug),
            lastmod: None,
            changefreq: ORGANIZATION_CHANGEFREQ,
            priority: ORGANIZATION_PRIORITY,
        })
        .collect())
}

/// Render entries as a sitemap `urlset` with absolute locations.
pub fn render_urlset(site_url: &str, entries: &[SitemapEntry]) -> String {
    let base = site_url.trim_end_matches('/');
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#,
    );
    for entry in entries {
        xml.push_str("<url>");
        xml.push_str(&format!("<loc>{}</loc>", xml_escape(&format!("{}{}", base, entry.loc))));
        if let Some(lastmod) = entry.lastmod {
            xml.push_str(&format!(
                "<lastmod>{}</lastmod>",
                lastmod.to_rfc3339_opts(SecondsFormat::Secs, true)
            ));
        }
        xml.push_str(&format!("<changefreq>{}</changefreq>", entry.changefreq));
        xml.push_str(&format!("<priority>{:.1}</priority>", entry.priority));
        xml.push_str("</url>");
    }
    xml.push_str("</urlset>");
    xml
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_absolute_escaped_locations() {
        let entries = vec![SitemapEntry {
            endpoint: SHOW_ENDPOINT,
            loc: "/organizations/r&d/".into(),
            lastmod: None,
            changefreq: ORGANIZATION_CHANGEFREQ,
            priority: ORGANIZATION_PRIORITY,
        }];

        let xml = render_urlset("https://data.example/", &entries);
        assert!(xml.contains("<loc>https://data.example/organizations/r&amp;d/</loc>"));
        assert!(xml.contains("<changefreq>weekly</changefreq><priority>0.7</priority>"));
        assert!(!xml.contains("<lastmod>"));
    }
}
