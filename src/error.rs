//! Error types for webflow-sitemap
//!
//! Defines the error enum covering every failure mode of the aggregator, the
//! sitemap synthesizer and the surrounding CLI/HTTP plumbing.
//! Uses thiserror for ergonomic error handling.

use thiserror::Error;

/// Result type alias for webflow-sitemap operations
pub type Result<T> = std::result::Result<T, SitemapError>;

/// Error type for webflow-sitemap operations
#[derive(Error, Debug)]
pub enum SitemapError {
    /// Missing or invalid caller input (API key, site id, base URL, selection)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A CMS request failed, returned an error status or unparsable content
    #[error("Remote fetch error: {0}")]
    RemoteFetch(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// XML encoding errors
    #[error("XML error: {0}")]
    Xml(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl SitemapError {
    /// Shorthand for a validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Shorthand for a remote fetch failure
    pub fn remote(message: impl Into<String>) -> Self {
        Self::RemoteFetch(message.into())
    }

    /// Whether the failure was caused by the caller's input rather than the CMS
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Whether the failure happened while talking to the CMS
    ///
    /// Transport and decoding errors raised by reqwest count as remote failures.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteFetch(_) | Self::Http(_))
    }
}
