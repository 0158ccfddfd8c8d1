//! Configuration validation
//!
//! Checks a loaded configuration before it is used:
//! - Server address parses as a socket address
//! - API base URL is http(s) and page size is within the API limit
//! - Language codes are non-empty and unique

use super::app_config::AppConfig;
use crate::SitemapError;
use std::collections::HashSet;
use std::net::SocketAddr;

/// Largest `limit` the Webflow list endpoints accept
pub const MAX_PAGE_SIZE: u32 = 100;

/// Validation error details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub context: Option<String>,
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            context: None,
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref ctx) = self.context {
            write!(f, "[{}] {}: {}", ctx, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// Validation result
pub type ValidationResult = std::result::Result<(), Vec<ValidationError>>;

/// Validate a webflow-sitemap configuration
pub fn validate_config(config: &AppConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if config.server.addr.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "server.addr",
            format!("Invalid listen address: {}", config.server.addr),
        ));
    }

    if config.server.max_body_size == 0 {
        errors.push(ValidationError::new(
            "server.max_body_size",
            "Body size limit must be greater than 0",
        ));
    }

    if !is_http_url(&config.cms.api_base_url) {
        errors.push(ValidationError::new(
            "cms.api_base_url",
            format!("Invalid API URL: {}", config.cms.api_base_url),
        ));
    }

    if config.cms.accept_version.trim().is_empty() {
        errors.push(ValidationError::new(
            "cms.accept_version",
            "API version cannot be empty",
        ));
    }

    if !(1..=MAX_PAGE_SIZE).contains(&config.cms.page_size) {
        errors.push(ValidationError::new(
            "cms.page_size",
            format!(
                "Page size {} out of range (1-{})",
                config.cms.page_size, MAX_PAGE_SIZE
            ),
        ));
    }

    if config.cms.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "cms.request_timeout_secs",
            "Timeout must be greater than 0",
        ));
    }

    if let Some(ref base_url) = config.sitemap.base_url {
        if !is_http_url(base_url) {
            errors.push(ValidationError::new(
                "sitemap.base_url",
                format!("Invalid site URL: {}", base_url),
            ));
        }
    }

    if config
        .sitemap
        .default_priority
        .trim()
        .parse::<f64>()
        .map_or(true, |p| !p.is_finite())
    {
        errors.push(ValidationError::new(
            "sitemap.default_priority",
            format!("Not a number: {}", config.sitemap.default_priority),
        ));
    }

    // Check for empty and duplicate language codes
    let mut seen_codes = HashSet::new();
    for (index, language) in config.sitemap.languages.iter().enumerate() {
        let code = language.code.trim();
        let context = format!("sitemap.languages[{}]", index);

        if code.is_empty() {
            errors.push(
                ValidationError::new("code", "Language code cannot be empty")
                    .with_context(context),
            );
        } else if !seen_codes.insert(code.to_ascii_lowercase()) {
            errors.push(
                ValidationError::new("code", format!("Duplicate language code: {}", code))
                    .with_context(context),
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

/// Validate configuration and return a Result
pub fn validate_config_result(config: &AppConfig) -> crate::Result<()> {
    validate_config(config).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        SitemapError::Config(format!(
            "Configuration validation failed:\n  - {}",
            messages.join("\n  - ")
        ))
    })
}
