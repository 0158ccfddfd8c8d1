//! Site aggregator implementation

use super::site_data::SiteData;
use crate::cms::{collect_all, paginate, CmsApi, CmsConnector, Collection, CollectionItem, Page};
use crate::sitemap::CollectionUrls;
use crate::{Result, SitemapError};
use futures::TryStreamExt;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Aggregator configuration
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Items requested per page from the list endpoints
    pub page_size: u32,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            page_size: crate::cms::DEFAULT_PAGE_SIZE,
        }
    }
}

/// Collects the publishable URLs of a site from the CMS
///
/// Requests are issued strictly one after another: pages are drained first,
/// then the collection list, then each collection's items in turn.
pub struct Aggregator {
    api: Arc<dyn CmsApi>,
    config: AggregatorConfig,
}

impl Aggregator {
    pub fn new(api: Arc<dyn CmsApi>) -> Self {
        Self::with_config(api, AggregatorConfig::default())
    }

    pub fn with_config(api: Arc<dyn CmsApi>, config: AggregatorConfig) -> Self {
        Self { api, config }
    }

    /// Every page of the site, drafts and archived pages included
    pub async fn fetch_all_pages(&self, site_id: &str) -> Result<Vec<Page>> {
        let api = &self.api;
        let limit = self.config.page_size;
        let pages =
            collect_all(limit, move |offset| api.list_pages(site_id, offset, limit)).await?;

        debug!(site_id = %site_id, pages = pages.len(), "Fetched pages");
        Ok(pages)
    }

    pub async fn fetch_all_collections(&self, site_id: &str) -> Result<Vec<Collection>> {
        let collections = self.api.list_collections(site_id).await?;
        debug!(site_id = %site_id, collections = collections.len(), "Fetched collections");
        Ok(collections)
    }

    /// Published items of a collection; drafts and archived items are dropped page by page
    pub async fn fetch_all_collection_items(
        &self,
        collection_id: &str,
    ) -> Result<Vec<CollectionItem>> {
        let api = &self.api;
        let limit = self.config.page_size;
        let items = paginate(limit, move |offset| {
            api.list_collection_items(collection_id, offset, limit)
        })
        .try_fold(Vec::new(), |mut eligible, page| async move {
            eligible.extend(page.into_iter().filter(CollectionItem::is_published));
            Ok::<_, SitemapError>(eligible)
        })
        .await?;

        debug!(
            collection_id = %collection_id,
            items = items.len(),
            "Fetched collection items"
        );
        Ok(items)
    }

    /// Build the [`SiteData`] of a site
    ///
    /// Any failing request aborts the whole run; no partial data is returned.
    pub async fn aggregate(&self, site_id: &str) -> Result<SiteData> {
        info!(site_id = %site_id, "Aggregating site");

        let pages = self.fetch_all_pages(site_id).await?;
        let mut collections = self.fetch_all_collections(site_id).await?;

        // Template pages bind a collection to their published path
        let collection_paths: HashMap<String, String> = pages
            .iter()
            .filter_map(|page| {
                page.collection_id
                    .clone()
                    .map(|id| (id, page.published_path.clone()))
            })
            .collect();

        let mut collection_items = CollectionUrls::new();
        for collection in &mut collections {
            collection.base_published_path = collection_paths.get(&collection.id).cloned();

            let items = self.fetch_all_collection_items(&collection.id).await?;
            let urls: Vec<String> = items
                .iter()
                .map(|item| collection.item_path(item.slug()))
                .collect();

            debug!(
                slug = %collection.slug,
                base_path = %collection.base_path(),
                urls = urls.len(),
                "Resolved collection URLs"
            );
            collection_items.insert(collection.slug.clone(), urls);
        }

        let static_pages: Vec<Page> = pages.into_iter().filter(Page::is_published).collect();

        info!(
            site_id = %site_id,
            static_pages = static_pages.len(),
            collections = collections.len(),
            "Site aggregated"
        );

        Ok(SiteData {
            static_pages,
            collections,
            collection_items,
        })
    }
}

/// Validate credentials, connect and aggregate a site
///
/// # Errors
/// Blank credentials are a validation error raised before any request is made.
pub async fn aggregate_site(
    connector: &dyn CmsConnector,
    api_key: &str,
    site_id: &str,
    config: AggregatorConfig,
) -> Result<SiteData> {
    let api_key = api_key.trim();
    let site_id = site_id.trim();
    if api_key.is_empty() || site_id.is_empty() {
        return Err(SitemapError::validation("API Key and Site ID are required"));
    }

    let api = connector.connect(api_key)?;
    Aggregator::with_config(api, config).aggregate(site_id).await
}
