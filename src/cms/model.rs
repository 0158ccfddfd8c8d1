//! Webflow Data API v2 wire types
//!
//! Only the fields the sitemap needs are modelled; everything else the API
//! returns is ignored on deserialization.

use serde::{Deserialize, Serialize};

/// A static or template page of a site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Live URL path, e.g. `/about` or `/` for the home page
    #[serde(default)]
    pub published_path: String,
    /// RFC 3339 timestamp of the last change
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub archived: bool,
    /// Set on collection template pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
}

impl Page {
    /// Whether this page can be listed in a sitemap
    pub fn is_published(&self) -> bool {
        !self.draft && !self.archived
    }

    /// Template pages render collection items rather than standing alone
    pub fn is_collection_template(&self) -> bool {
        self.collection_id.is_some()
    }
}

/// A CMS collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub slug: String,
    #[serde(default)]
    pub display_name: String,
    /// Published path of the page bound to this collection, filled in during aggregation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_published_path: Option<String>,
}

impl Collection {
    /// Path that item slugs are appended to
    pub fn base_path(&self) -> String {
        match &self.base_published_path {
            Some(path) => path.clone(),
            None => format!("/{}", self.slug),
        }
    }

    /// Public path of an item of this collection
    pub fn item_path(&self, item_slug: &str) -> String {
        format!("{}/{}", self.base_path(), item_slug)
    }
}

/// A single collection item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub is_draft: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub field_data: ItemFieldData,
}

impl CollectionItem {
    pub fn slug(&self) -> &str {
        &self.field_data.slug
    }

    /// Whether this item can be listed in a sitemap
    pub fn is_published(&self) -> bool {
        !self.is_draft && !self.is_archived
    }
}

/// The subset of an item's field data the sitemap needs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemFieldData {
    #[serde(default)]
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// `GET /sites/{site_id}/pages` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageListResponse {
    #[serde(default)]
    pub pages: Vec<Page>,
}

/// `GET /sites/{site_id}/collections` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectionListResponse {
    #[serde(default)]
    pub collections: Vec<Collection>,
}

/// `GET /collections/{collection_id}/items` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemListResponse {
    #[serde(default)]
    pub items: Vec<CollectionItem>,
}
