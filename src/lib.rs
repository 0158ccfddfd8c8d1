//! webflow-sitemap - XML sitemaps for Webflow CMS sites
//!
//! Pulls every page, collection and collection item of a Webflow site through
//! the Data API and renders a sitemap with hreflang alternates for sites
//! published in several languages.
//!
//! # Architecture
//!
//! - **cms**: Data API wire types, the `CmsApi` seam and its reqwest client
//! - **aggregator**: Paginated, sequential collection of a site's URLs
//! - **sitemap**: Priority ordering, localization and XML rendering
//! - **config**: YAML configuration and validation
//! - **server**: HTTP API (axum)

// Core modules
pub mod aggregator;
pub mod cms;
pub mod config;
pub mod error;
pub mod sitemap;

// Surfaces
pub mod logging;
pub mod server;

// Re-exports
pub use error::{Result, SitemapError};
