//! Sitemap synthesis
//!
//! Turns a selection of static pages and collections into a sitemap document:
//!
//! 1. Selected static pages, then every item URL of each selected collection,
//!    become [`SitemapEntry`] values.
//! 2. Entries are sorted by priority, highest first. Ties keep their order.
//! 3. Each entry is written once per language, with hreflang alternates when
//!    more than one language is configured.
//!
//! Synthesis is pure: it reads the request and the aggregated item URLs and
//! allocates a new string. Nothing here touches the network.

pub mod entry;
pub mod language;
pub mod xml;

pub use entry::{
    format_date, lastmod_date, CollectionSelection, Priority, SitemapEntry, StaticSelection,
};
pub use language::{normalize_base_url, normalize_languages, LanguageConfig};
pub use xml::{write_urlset, SITEMAP_NS, XHTML_NS};

use crate::{Result, SitemapError};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Item URL paths per collection slug, as produced by the aggregator
pub type CollectionUrls = BTreeMap<String, Vec<String>>;

/// Everything the user picked for one sitemap
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapRequest {
    #[serde(default)]
    pub selected_static_entries: Vec<StaticSelection>,

    #[serde(default)]
    pub selected_collections: Vec<CollectionSelection>,

    /// Site URL the paths are appended to, e.g. `https://example.com`
    #[serde(default)]
    pub base_url: String,

    /// Ordered language variants; the first is the default
    #[serde(default)]
    pub language_configs: Vec<LanguageConfig>,
}

impl SitemapRequest {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_static(mut self, selection: StaticSelection) -> Self {
        self.selected_static_entries.push(selection);
        self
    }

    pub fn with_collection(mut self, selection: CollectionSelection) -> Self {
        self.selected_collections.push(selection);
        self
    }

    pub fn with_language(mut self, language: LanguageConfig) -> Self {
        self.language_configs.push(language);
        self
    }

    /// Flatten the selection into entries sorted by descending priority
    ///
    /// # Errors
    /// A selected collection that has no entry in `collection_items` is a
    /// validation error.
    pub fn build_entries(
        &self,
        collection_items: &CollectionUrls,
        today: NaiveDate,
    ) -> Result<Vec<SitemapEntry>> {
        let mut entries: Vec<SitemapEntry> = self
            .selected_static_entries
            .iter()
            .map(|page| {
                SitemapEntry::new(
                    page.path.clone(),
                    lastmod_date(page.lastmod.as_deref(), today),
                    Priority::parse(page.priority.as_deref()),
                )
            })
            .collect();

        let today = format_date(today);
        for collection in &self.selected_collections {
            let urls = collection_items.get(&collection.slug).ok_or_else(|| {
                SitemapError::validation(format!("Unknown collection: {}", collection.slug))
            })?;
            let priority = Priority::parse(collection.priority.as_deref());

            entries.extend(
                urls.iter()
                    .map(|url| SitemapEntry::new(url.clone(), today.clone(), priority)),
            );
        }

        // sort_by is stable, equal priorities keep insertion order
        entries.sort_by(|a, b| b.priority.value().total_cmp(&a.priority.value()));
        Ok(entries)
    }

    /// Render the sitemap as of `today`
    ///
    /// # Errors
    /// Returns a validation error, and produces no XML, when the base URL is
    /// blank or a selected collection is unknown.
    pub fn render(&self, collection_items: &CollectionUrls, today: NaiveDate) -> Result<String> {
        let base_url = normalize_base_url(&self.base_url)?;
        let languages = normalize_languages(&self.language_configs);
        let entries = self.build_entries(collection_items, today)?;

        debug!(
            base_url = %base_url,
            entries = entries.len(),
            languages = languages.len(),
            "Rendering sitemap"
        );

        write_urlset(&entries, &base_url, &languages)
    }

    /// Render the sitemap using today's UTC date for collection items
    pub fn generate(&self, collection_items: &CollectionUrls) -> Result<String> {
        self.render(collection_items, Utc::now().date_naive())
    }
}
