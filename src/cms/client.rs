//! Webflow Data API client
//!
//! [`CmsApi`] is the seam the aggregator talks through: one method per list
//! endpoint, each returning a single page of results. [`WebflowClient`] is the
//! reqwest implementation used in production.

use super::model::{
    Collection, CollectionItem, CollectionListResponse, ItemListResponse, Page, PageListResponse,
};
use crate::config::CmsConfig;
use crate::{Result, SitemapError};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Read access to the CMS list endpoints
#[async_trait]
pub trait CmsApi: Send + Sync {
    /// One page of a site's pages
    async fn list_pages(&self, site_id: &str, offset: u32, limit: u32) -> Result<Vec<Page>>;

    /// All collections of a site (not paginated)
    async fn list_collections(&self, site_id: &str) -> Result<Vec<Collection>>;

    /// One page of a collection's items, drafts and archived items included
    async fn list_collection_items(
        &self,
        collection_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<CollectionItem>>;
}

/// Builds an API handle for the credentials carried by a request
pub trait CmsConnector: Send + Sync {
    fn connect(&self, api_key: &str) -> Result<Arc<dyn CmsApi>>;
}

/// reqwest-backed Webflow v2 client
pub struct WebflowClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl WebflowClient {
    /// Create a new client authenticated with `api_key`
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &CmsConfig, api_key: impl Into<String>) -> Result<Self> {
        let accept_version = header::HeaderValue::from_str(&config.accept_version).map_err(|_| {
            SitemapError::Config(format!(
                "Invalid accept-version header value: {}",
                config.accept_version
            ))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .default_headers({
                let mut headers = header::HeaderMap::new();
                headers.insert(
                    header::USER_AGENT,
                    header::HeaderValue::from_static("webflow-sitemap/0.1"),
                );
                headers.insert(
                    header::ACCEPT,
                    header::HeaderValue::from_static("application/json"),
                );
                headers.insert(header::HeaderName::from_static("accept-version"), accept_version);
                headers
            })
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET a JSON document, mapping every failure to a remote fetch error
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, u32)],
        what: &str,
    ) -> Result<T> {
        debug!(url = %url, ?query, "Requesting {}", what);

        let response = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| SitemapError::remote(format!("Request for {} failed: {}", what, e)))?;

        match response.status() {
            status if status.is_success() => response.json::<T>().await.map_err(|e| {
                SitemapError::remote(format!("Malformed {} response: {}", what, e))
            }),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SitemapError::remote(
                format!("Webflow authentication failed while fetching {}", what),
            )),
            StatusCode::NOT_FOUND => Err(SitemapError::remote(format!(
                "Webflow returned not found for {}",
                what
            ))),
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                Err(SitemapError::remote(format!(
                    "Webflow rate limited {}, retry after {} seconds",
                    what, retry_after
                )))
            }
            status => {
                let error_body = response.text().await.unwrap_or_default();
                Err(SitemapError::remote(format!(
                    "Webflow API error for {}: HTTP {}: {}",
                    what, status, error_body
                )))
            }
        }
    }
}

#[async_trait]
impl CmsApi for WebflowClient {
    async fn list_pages(&self, site_id: &str, offset: u32, limit: u32) -> Result<Vec<Page>> {
        let url = format!(
            "{}/sites/{}/pages",
            self.base_url,
            urlencoding::encode(site_id)
        );
        let response: PageListResponse = self
            .get_json(&url, &[("limit", limit), ("offset", offset)], "pages")
            .await?;
        Ok(response.pages)
    }

    async fn list_collections(&self, site_id: &str) -> Result<Vec<Collection>> {
        let url = format!(
            "{}/sites/{}/collections",
            self.base_url,
            urlencoding::encode(site_id)
        );
        let response: CollectionListResponse = self.get_json(&url, &[], "collections").await?;
        Ok(response.collections)
    }

    async fn list_collection_items(
        &self,
        collection_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<CollectionItem>> {
        let url = format!(
            "{}/collections/{}/items",
            self.base_url,
            urlencoding::encode(collection_id)
        );
        let response: ItemListResponse = self
            .get_json(
                &url,
                &[("limit", limit), ("offset", offset)],
                "collection items",
            )
            .await?;
        Ok(response.items)
    }
}

/// Connector that builds a [`WebflowClient`] per API key
#[derive(Debug, Clone)]
pub struct WebflowConnector {
    config: CmsConfig,
}

impl WebflowConnector {
    pub fn new(config: CmsConfig) -> Self {
        Self { config }
    }
}

impl CmsConnector for WebflowConnector {
    fn connect(&self, api_key: &str) -> Result<Arc<dyn CmsApi>> {
        Ok(Arc::new(WebflowClient::new(&self.config, api_key)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let config = CmsConfig::default();
        let client = WebflowClient::new(&config, "token").expect("Failed to create client");
        assert_eq!(client.base_url(), "https://api.webflow.com/v2");
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = CmsConfig {
            api_base_url: "http://127.0.0.1:9999/v2/".to_string(),
            ..CmsConfig::default()
        };
        let client = WebflowClient::new(&config, "token").unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:9999/v2");
    }

    #[test]
    fn test_invalid_accept_version() {
        let config = CmsConfig {
            accept_version: "2.0.0\n".to_string(),
            ..CmsConfig::default()
        };
        let result = WebflowClient::new(&config, "token");
        assert!(matches!(result, Err(SitemapError::Config(_))));
    }

    #[test]
    fn test_connector() {
        let connector = WebflowConnector::new(CmsConfig::default());
        assert!(connector.connect("token").is_ok());
    }
}
