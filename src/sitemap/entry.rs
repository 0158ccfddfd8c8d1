//! Sitemap entries, priorities and the selections they are built from

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Change frequency written for every URL
pub const CHANGEFREQ: &str = "weekly";

/// Sitemap priority, kept at one decimal
///
/// Values are not clamped to `[0.1, 1.0]`; whatever number comes in is only
/// rounded to one fractional digit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Priority(f64);

impl Priority {
    /// Used when a priority is missing or not a number
    pub const DEFAULT: Priority = Priority(0.8);

    /// Round a number to one decimal; non-finite values fall back to the default
    ///
    /// Rounding is to the nearest tenth of the exact binary value, with exact
    /// halves going away from zero: 0.25 becomes 0.3 while 0.85 (stored just
    /// below 0.85) becomes 0.8.
    pub fn from_value(value: f64) -> Self {
        if !value.is_finite() {
            return Self::DEFAULT;
        }

        // An exact half at the first decimal is k/4 for odd k
        let quarters = value.abs() * 4.0;
        if quarters.fract() == 0.0 && quarters % 2.0 == 1.0 {
            let tenths = (value.abs() * 10.0).ceil();
            return Priority(tenths.copysign(value) / 10.0);
        }

        // Round through the same formatting used for output so sorting and
        // rendering always agree
        format!("{:.1}", value)
            .parse()
            .map(Priority)
            .unwrap_or(Self::DEFAULT)
    }

    /// Parse user input such as "0.83"; missing or non-numeric input gives 0.8
    pub fn parse(input: Option<&str>) -> Self {
        input
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse::<f64>().ok())
            .map(Self::from_value)
            .unwrap_or(Self::DEFAULT)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// One URL of the sitemap before localization
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    /// URL path, e.g. `/about`
    pub loc: String,
    /// `YYYY-MM-DD`
    pub lastmod: String,
    pub priority: Priority,
}

impl SitemapEntry {
    pub fn new(loc: impl Into<String>, lastmod: impl Into<String>, priority: Priority) -> Self {
        Self {
            loc: loc.into(),
            lastmod: lastmod.into(),
            priority,
        }
    }
}

/// A static page picked for the sitemap
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticSelection {
    /// Published path of the page
    pub path: String,
    /// Stored last-updated timestamp; only the date part is used
    #[serde(default)]
    pub lastmod: Option<String>,
    #[serde(default, deserialize_with = "deserialize_priority")]
    pub priority: Option<String>,
}

impl StaticSelection {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_lastmod(mut self, lastmod: impl Into<String>) -> Self {
        self.lastmod = Some(lastmod.into());
        self
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }
}

/// A collection picked for the sitemap, with the priority for all its items
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSelection {
    pub slug: String,
    #[serde(default, deserialize_with = "deserialize_priority")]
    pub priority: Option<String>,
}

impl CollectionSelection {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            priority: None,
        }
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }
}

/// Date part of a stored timestamp, or `today` when there is none
pub fn lastmod_date(stored: Option<&str>, today: NaiveDate) -> String {
    stored
        .and_then(|s| s.split('T').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format_date(today))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Priorities arrive from form inputs as strings, but numbers are accepted too
fn deserialize_priority<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(f64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    }))
}
