//! Aggregated view of a site

use crate::cms::{Collection, Page};
use crate::sitemap::{CollectionSelection, CollectionUrls, SitemapRequest, StaticSelection};
use serde::{Deserialize, Serialize};

/// Publishable pages and collection URLs of one site
///
/// Serializes to the `{staticPages, collections, collectionItems}` payload the
/// HTTP API returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteData {
    /// Pages that are neither draft nor archived
    pub static_pages: Vec<Page>,

    /// Every collection of the site, with its base path resolved where a page binds it
    pub collections: Vec<Collection>,

    /// Published item paths per collection slug
    pub collection_items: CollectionUrls,
}

impl SiteData {
    /// Static pages offered for selection (collection template pages excluded)
    pub fn selectable_pages(&self) -> impl Iterator<Item = &Page> {
        self.static_pages
            .iter()
            .filter(|page| !page.is_collection_template())
    }

    pub fn collection(&self, slug: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.slug == slug)
    }

    /// Number of published items in a collection (0 for unknown slugs)
    pub fn item_count(&self, slug: &str) -> usize {
        self.collection_items.get(slug).map_or(0, Vec::len)
    }

    /// Total number of URLs available for a sitemap
    pub fn url_count(&self) -> usize {
        self.selectable_pages().count() + self.collection_items.values().map(Vec::len).sum::<usize>()
    }

    /// Selection for the static page published at `path`
    ///
    /// Carries the page's last-updated timestamp when the page is known.
    pub fn static_selection(&self, path: &str, priority: &str) -> StaticSelection {
        let selection = StaticSelection::new(path).with_priority(priority);
        match self
            .static_pages
            .iter()
            .find(|page| page.published_path == path)
            .and_then(|page| page.last_updated.as_deref())
        {
            Some(last_updated) => selection.with_lastmod(last_updated),
            None => selection,
        }
    }

    /// Request selecting every selectable page and every collection
    pub fn select_all(&self, base_url: &str, priority: &str) -> SitemapRequest {
        let mut request = SitemapRequest::new(base_url);
        request.selected_static_entries = self
            .selectable_pages()
            .map(|page| self.static_selection(&page.published_path, priority))
            .collect();
        request.selected_collections = self
            .collections
            .iter()
            .map(|c| CollectionSelection::new(c.slug.clone()).with_priority(priority))
            .collect();
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(id: &str, path: &str, collection_id: Option<&str>) -> Page {
        Page {
            id: id.to_string(),
            title: id.to_string(),
            published_path: path.to_string(),
            last_updated: Some(format!("2024-02-0{}T10:00:00Z", path.len())),
            draft: false,
            archived: false,
            collection_id: collection_id.map(str::to_string),
        }
    }

    fn sample() -> SiteData {
        let mut collection_items = CollectionUrls::new();
        collection_items.insert(
            "posts".to_string(),
            vec!["/blog/a".to_string(), "/blog/b".to_string()],
        );
        collection_items.insert("authors".to_string(), Vec::new());

        SiteData {
            static_pages: vec![
                page("home", "/", None),
                page("blog", "/blog", Some("c1")),
                page("about", "/about", None),
            ],
            collections: vec![Collection {
                id: "c1".to_string(),
                slug: "posts".to_string(),
                display_name: "Posts".to_string(),
                base_published_path: Some("/blog".to_string()),
            }],
            collection_items,
        }
    }

    #[test]
    fn test_selectable_pages_skip_templates() {
        let data = sample();
        let ids: Vec<&str> = data.selectable_pages().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["home", "about"]);
    }

    #[test]
    fn test_counts() {
        let data = sample();
        assert_eq!(data.item_count("posts"), 2);
        assert_eq!(data.item_count("authors"), 0);
        assert_eq!(data.item_count("missing"), 0);
        assert_eq!(data.url_count(), 4);
        assert!(data.collection("posts").is_some());
    }

    #[test]
    fn test_static_selection_lastmod() {
        let data = sample();
        let about = data.static_selection("/about", "0.5");
        assert_eq!(about.lastmod.as_deref(), Some("2024-02-06T10:00:00Z"));
        assert_eq!(about.priority.as_deref(), Some("0.5"));

        let unknown = data.static_selection("/missing", "0.5");
        assert_eq!(unknown.lastmod, None);
    }

    #[test]
    fn test_select_all() {
        let request = sample().select_all("https://x.com", "0.7");
        let paths: Vec<&str> = request
            .selected_static_entries
            .iter()
            .map(|s| s.path.as_str())
            .collect();
        assert_eq!(paths, vec!["/", "/about"]);
        assert_eq!(
            request.selected_collections,
            vec![CollectionSelection::new("posts").with_priority("0.7")]
        );
        assert_eq!(request.base_url, "https://x.com");
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json["staticPages"].is_array());
        assert_eq!(json["staticPages"][1]["collectionId"], "c1");
        assert_eq!(json["collections"][0]["slug"], "posts");
        assert_eq!(json["collectionItems"]["posts"][1], "/blog/b");
        assert_eq!(json["collectionItems"]["authors"], serde_json::json!([]));
    }
}
