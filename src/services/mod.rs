pub mod catalog_service;
pub mod csv_export;
pub mod search_service;
pub mod sitemap;
