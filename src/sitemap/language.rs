//! Language variants and URL localization

use crate::{Result, SitemapError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One language variant of the site
///
/// The first config of a list is the default language and the target of the
/// `x-default` alternate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageConfig {
    /// hreflang code, e.g. "en" or "fr-CA"
    pub code: String,

    /// Subfolder the language is served under; empty for the site root
    #[serde(default)]
    pub folder: String,
}

impl LanguageConfig {
    pub fn new(code: impl Into<String>, folder: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            folder: folder.into(),
        }
    }

    /// Absolute URL of `loc` in this language
    ///
    /// `base_url` must already end with `/` (see [`normalize_base_url`]). The
    /// root path `/` maps to the base URL itself (or the language folder) so
    /// no doubled slash is produced.
    pub fn localize(&self, base_url: &str, loc: &str) -> String {
        let is_root = loc == "/";
        if self.folder.is_empty() {
            let path = if is_root {
                ""
            } else {
                loc.strip_prefix('/').unwrap_or(loc)
            };
            format!("{}{}", base_url, path)
        } else {
            let path = if is_root { "" } else { loc };
            format!("{}{}{}", base_url, self.folder, path)
        }
    }
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self::new("en", "")
    }
}

impl fmt::Display for LanguageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.folder.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{}:{}", self.code, self.folder)
        }
    }
}

impl FromStr for LanguageConfig {
    type Err = SitemapError;

    /// Parse `code` or `code:folder`
    fn from_str(s: &str) -> Result<Self> {
        let (code, folder) = s.split_once(':').unwrap_or((s, ""));
        let config = Self::new(code.trim(), clean_folder(folder));
        if config.code.is_empty() {
            return Err(SitemapError::validation(format!(
                "Invalid language '{}': expected CODE or CODE:FOLDER",
                s
            )));
        }
        Ok(config)
    }
}

fn clean_folder(folder: &str) -> String {
    folder.trim().trim_matches('/').to_string()
}

/// Trim codes and folders, drop configs without a code, default to English
pub fn normalize_languages(configs: &[LanguageConfig]) -> Vec<LanguageConfig> {
    let mut languages: Vec<LanguageConfig> = configs
        .iter()
        .map(|c| LanguageConfig::new(c.code.trim(), clean_folder(&c.folder)))
        .filter(|c| !c.code.is_empty())
        .collect();

    if languages.is_empty() {
        languages.push(LanguageConfig::default());
    }
    languages
}

/// Trim the base URL and make sure it ends with `/`
///
/// # Errors
/// A blank base URL is a validation error.
pub fn normalize_base_url(base_url: &str) -> Result<String> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return Err(SitemapError::validation("Base URL is required"));
    }

    if trimmed.ends_with('/') {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{}/", trimmed))
    }
}
