pub mod export_handlers;
pub mod health_handlers;
pub mod organization_handlers;
pub mod sitemap_handlers;
