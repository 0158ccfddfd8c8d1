//! webflow-sitemap configuration file handling
//!
//! Loads and manages the ~/.config/webflow-sitemap/config.yaml file.

use crate::cms::DEFAULT_PAGE_SIZE;
use crate::sitemap::LanguageConfig;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// HTTP service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_addr")]
    pub addr: String,

    /// Request body size limit in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

fn default_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_max_body_size() -> usize {
    1024 * 1024 // 1MB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            max_body_size: default_max_body_size(),
        }
    }
}

/// Webflow API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CmsConfig {
    /// Root of the Data API, without trailing slash
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Value of the `accept-version` header
    #[serde(default = "default_accept_version")]
    pub accept_version: String,

    /// Items per request on paginated endpoints (the API allows at most 100)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "https://api.webflow.com/v2".to_string()
}

fn default_accept_version() -> String {
    "2.0.0".to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            accept_version: default_accept_version(),
            page_size: default_page_size(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Defaults for `generate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitemapSettings {
    /// Site URL used when none is given on the command line
    #[serde(default)]
    pub base_url: Option<String>,

    /// Priority of pages and collections selected without an explicit one
    #[serde(default = "default_priority")]
    pub default_priority: String,

    /// Language variants, default language first
    #[serde(default)]
    pub languages: Vec<LanguageConfig>,
}

fn default_priority() -> String {
    "0.8".to_string()
}

impl Default for SitemapSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            default_priority: default_priority(),
            languages: Vec::new(),
        }
    }
}

/// webflow-sitemap configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub cms: CmsConfig,

    #[serde(default)]
    pub sitemap: SitemapSettings,
}

impl AppConfig {
    /// Create a configuration with every default
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from the default path (~/.config/webflow-sitemap/config.yaml)
    pub fn load_default() -> Result<Self> {
        let path = Self::default_path();
        Self::load(&path)
    }

    /// Load the default file, falling back to built-in defaults when it does not exist
    pub fn load_or_default() -> Result<Self> {
        let path = Self::default_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::new());
        }
        Self::load(&path)
    }

    /// Load configuration from a specific path
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(crate::SitemapError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        tracing::info!(path = %path.display(), "Loading configuration");

        let content = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;

        tracing::debug!(
            addr = %config.server.addr,
            api = %config.cms.api_base_url,
            languages = config.sitemap.languages.len(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        tracing::info!(path = %path.display(), "Saving configuration");

        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;

        Ok(())
    }

    /// Get the default config path (~/.config/webflow-sitemap/config.yaml)
    pub fn default_path() -> PathBuf {
        // Always use ~/.config for consistency across platforms (macOS, Linux)
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".config");
        path.push("webflow-sitemap");
        path.push("config.yaml");
        path
    }
}
