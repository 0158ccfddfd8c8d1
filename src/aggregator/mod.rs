//! Remote data aggregator
//!
//! Paginates through a site's pages and collection items and assembles the
//! [`SiteData`] the sitemap is generated from.

mod site_aggregator;
mod site_data;

pub use site_aggregator::{aggregate_site, Aggregator, AggregatorConfig};
pub use site_data::SiteData;
