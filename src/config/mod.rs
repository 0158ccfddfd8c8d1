//! Configuration system
//!
//! Loads ~/.config/webflow-sitemap/config.yaml with support for:
//! - HTTP service address and body limit
//! - Webflow API endpoint, version header, page size and timeout
//! - Sitemap defaults (site URL, priority, language variants)
//!
//! Every section is optional; missing keys fall back to built-in defaults.

mod app_config;
pub mod validation;

pub use app_config::{AppConfig, CmsConfig, ServerConfig, SitemapSettings};
pub use validation::{validate_config, validate_config_result, ValidationError};

use crate::aggregator::AggregatorConfig;

impl From<&CmsConfig> for AggregatorConfig {
    fn from(cms: &CmsConfig) -> Self {
        Self {
            page_size: cms.page_size,
        }
    }
}
