//! Integration tests for webflow-sitemap
//!
//! A local axum server stands in for the Webflow Data API. The real reqwest
//! client, the aggregator and the HTTP API are driven against it end to end.

use axum::{
    body::{to_bytes, Body},
    extract::{Path, Query, State},
    http::{HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tower::ServiceExt;
use webflow_sitemap::aggregator::{aggregate_site, AggregatorConfig};
use webflow_sitemap::cms::{CmsApi, WebflowClient, WebflowConnector};
use webflow_sitemap::config::{AppConfig, CmsConfig};
use webflow_sitemap::server::SitemapServer;
use webflow_sitemap::SitemapError;

const TOKEN: &str = "test-token";

/// Content and request log of the fake API
#[derive(Default)]
struct FakeWebflow {
    pages: Vec<Value>,
    collections: Vec<Value>,
    items: HashMap<String, Vec<Value>>,
    requests: Mutex<Vec<String>>,
}

impl FakeWebflow {
    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn count(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.starts_with(prefix))
            .count()
    }
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    limit: usize,
    offset: usize,
}

fn authorize(headers: &HeaderMap) -> Result<(), Response> {
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TOKEN))
        .unwrap_or(false);
    let version = headers
        .get("accept-version")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == "2.0.0")
        .unwrap_or(false);

    if bearer && version {
        Ok(())
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "code": "not_authorized" })),
        )
            .into_response())
    }
}

fn window(all: &[Value], query: &PageQuery) -> Vec<Value> {
    all.iter()
        .skip(query.offset)
        .take(query.limit)
        .cloned()
        .collect()
}

async fn list_pages(
    State(fake): State<Arc<FakeWebflow>>,
    Path(site_id): Path<String>,
    Query(query): Query<PageQuery>,
    headers: HeaderMap,
) -> Response {
    fake.requests
        .lock()
        .unwrap()
        .push(format!("pages:{}:{}:{}", site_id, query.offset, query.limit));
    if let Err(denied) = authorize(&headers) {
        return denied;
    }
    if site_id == "broken" {
        return "<html>maintenance</html>".into_response();
    }
    Json(json!({ "pages": window(&fake.pages, &query) })).into_response()
}

async fn list_collections(
    State(fake): State<Arc<FakeWebflow>>,
    Path(site_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    fake.requests
        .lock()
        .unwrap()
        .push(format!("collections:{}", site_id));
    if let Err(denied) = authorize(&headers) {
        return denied;
    }
    Json(json!({ "collections": fake.collections })).into_response()
}

async fn list_items(
    State(fake): State<Arc<FakeWebflow>>,
    Path(collection_id): Path<String>,
    Query(query): Query<PageQuery>,
    headers: HeaderMap,
) -> Response {
    fake.requests
        .lock()
        .unwrap()
        .push(format!("items:{}:{}", collection_id, query.offset));
    if let Err(denied) = authorize(&headers) {
        return denied;
    }
    match fake.items.get(&collection_id) {
        Some(items) => Json(json!({ "items": window(items, &query) })).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "code": "not_found" }))).into_response(),
    }
}

/// Start the fake API and return its `/v2` base URL
async fn spawn_fake(fake: Arc<FakeWebflow>) -> String {
    let app = Router::new()
        .route("/v2/sites/{site_id}/pages", get(list_pages))
        .route("/v2/sites/{site_id}/collections", get(list_collections))
        .route("/v2/collections/{collection_id}/items", get(list_items))
        .with_state(fake);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/v2", addr)
}

fn cms_config(api_base_url: &str) -> CmsConfig {
    CmsConfig {
        api_base_url: api_base_url.to_string(),
        request_timeout_secs: 5,
        ..CmsConfig::default()
    }
}

fn page(id: &str, path: &str) -> Value {
    json!({
        "id": id,
        "title": id,
        "publishedPath": path,
        "lastUpdated": "2024-03-01T12:00:00.000Z",
        "draft": false,
        "archived": false,
        "seo": { "title": id }
    })
}

fn item(slug: &str, is_draft: bool, is_archived: bool) -> Value {
    json!({
        "id": slug,
        "isDraft": is_draft,
        "isArchived": is_archived,
        "fieldData": { "slug": slug, "name": slug }
    })
}

/// A small site: home, about, a draft, a blog template and two collections
fn sample_site() -> FakeWebflow {
    let mut draft = page("draft", "/draft");
    draft["draft"] = json!(true);
    let mut template = page("blog", "/blog");
    template["collectionId"] = json!("c-posts");

    let mut items = HashMap::new();
    items.insert(
        "c-posts".to_string(),
        vec![item("hello", false, false), item("wip", true, false)],
    );
    items.insert(
        "c-authors".to_string(),
        vec![item("jane", false, false), item("old", false, true)],
    );

    FakeWebflow {
        pages: vec![page("home", "/"), page("about", "/about"), draft, template],
        collections: vec![
            json!({ "id": "c-posts", "slug": "posts", "displayName": "Posts" }),
            json!({ "id": "c-authors", "slug": "authors", "displayName": "Authors" }),
        ],
        items,
        ..FakeWebflow::default()
    }
}

mod client_tests {
    use super::*;

    #[tokio::test]
    async fn test_pages_paginate_until_short_page() {
        let fake = Arc::new(FakeWebflow {
            pages: (0..250).map(|i| page(&i.to_string(), &format!("/p{}", i))).collect(),
            ..FakeWebflow::default()
        });
        let base_url = spawn_fake(fake.clone()).await;

        let connector = WebflowConnector::new(cms_config(&base_url));
        let data = aggregate_site(&connector, TOKEN, "site", AggregatorConfig::default())
            .await
            .unwrap();

        assert_eq!(data.static_pages.len(), 250);
        assert_eq!(
            fake.requests()[..3],
            [
                "pages:site:0:100".to_string(),
                "pages:site:100:100".to_string(),
                "pages:site:200:100".to_string(),
            ]
        );
        assert_eq!(fake.count("pages:"), 3);
    }

    #[tokio::test]
    async fn test_exact_multiple_needs_empty_page() {
        let fake = Arc::new(FakeWebflow {
            pages: (0..4).map(|i| page(&i.to_string(), &format!("/p{}", i))).collect(),
            ..FakeWebflow::default()
        });
        let base_url = spawn_fake(fake.clone()).await;

        let connector = WebflowConnector::new(cms_config(&base_url));
        let data = aggregate_site(&connector, TOKEN, "site", AggregatorConfig { page_size: 2 })
            .await
            .unwrap();

        assert_eq!(data.static_pages.len(), 4);
        assert_eq!(fake.count("pages:"), 3);
    }

    #[tokio::test]
    async fn test_client_sends_headers_and_query() {
        let fake = Arc::new(sample_site());
        let base_url = spawn_fake(fake.clone()).await;

        let client = WebflowClient::new(&cms_config(&format!("{}/", base_url)), TOKEN).unwrap();
        assert_eq!(client.base_url(), base_url);

        let pages = client.list_pages("site", 1, 2).await.unwrap();
        let ids: Vec<&str> = pages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["about", "draft"]);
        assert_eq!(fake.requests(), vec!["pages:site:1:2"]);
    }

    #[tokio::test]
    async fn test_bad_token_is_remote_error() {
        let fake = Arc::new(sample_site());
        let base_url = spawn_fake(fake.clone()).await;

        let connector = WebflowConnector::new(cms_config(&base_url));
        let err = aggregate_site(&connector, "wrong", "site", AggregatorConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, SitemapError::RemoteFetch(_)));
        assert!(err.to_string().contains("authentication"));
        // Aborted after the first failing request
        assert_eq!(fake.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_body_is_remote_error() {
        let fake = Arc::new(sample_site());
        let base_url = spawn_fake(fake).await;

        let client = WebflowClient::new(&cms_config(&base_url), TOKEN).unwrap();
        let err = client.list_pages("broken", 0, 100).await.unwrap_err();
        assert!(err.is_remote());
    }

    #[tokio::test]
    async fn test_unknown_collection_is_remote_error() {
        let fake = Arc::new(sample_site());
        let base_url = spawn_fake(fake).await;

        let client = WebflowClient::new(&cms_config(&base_url), TOKEN).unwrap();
        let err = client
            .list_collection_items("c-missing", 0, 100)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_unreachable_api_is_remote_error() {
        // Bind then drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client =
            WebflowClient::new(&cms_config(&format!("http://{}/v2", addr)), TOKEN).unwrap();
        let err = client.list_collections("site").await.unwrap_err();
        assert!(err.is_remote());
    }
}

mod aggregation_tests {
    use super::*;

    #[tokio::test]
    async fn test_full_site_aggregation() {
        let fake = Arc::new(sample_site());
        let base_url = spawn_fake(fake.clone()).await;

        let connector = WebflowConnector::new(cms_config(&base_url));
        let data = aggregate_site(&connector, TOKEN, "site", AggregatorConfig::default())
            .await
            .unwrap();

        let paths: Vec<&str> = data
            .static_pages
            .iter()
            .map(|p| p.published_path.as_str())
            .collect();
        assert_eq!(paths, vec!["/", "/about", "/blog"]);

        assert_eq!(data.collection_items["posts"], vec!["/blog/hello"]);
        assert_eq!(data.collection_items["authors"], vec!["/authors/jane"]);

        assert_eq!(
            fake.requests(),
            vec![
                "pages:site:0:100",
                "collections:site",
                "items:c-posts:0",
                "items:c-authors:0",
            ]
        );
    }
}

mod server_tests {
    use super::*;

    async fn post(app: Router, uri: &str, body: Value) -> Response {
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn app_config(base_url: &str) -> AppConfig {
        AppConfig {
            cms: cms_config(base_url),
            ..AppConfig::new()
        }
    }

    #[tokio::test]
    async fn test_fetch_then_generate() {
        let fake = Arc::new(sample_site());
        let base_url = spawn_fake(fake).await;
        let server = SitemapServer::new(&app_config(&base_url));

        let response = post(
            server.router(),
            "/api/fetch-data",
            json!({ "apiKey": TOKEN, "siteId": "site" }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let site: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(site["staticPages"].as_array().unwrap().len(), 3);

        let response = post(
            server.router(),
            "/api/generate-sitemap",
            json!({
                "selectedStaticEntries": [
                    { "path": "/about", "lastmod": "2024-03-01T12:00:00.000Z", "priority": "0.5" },
                    { "path": "/", "priority": "1.0" }
                ],
                "selectedCollections": [{ "slug": "posts", "priority": "0.7" }],
                "collectionItems": site["collectionItems"],
                "baseUrl": "https://example.com",
                "languageConfigs": [
                    { "code": "en", "folder": "" },
                    { "code": "de", "folder": "de" }
                ]
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let xml = body_string(response).await;
        assert!(xml.starts_with("<?xml"));
        assert_eq!(xml.matches("<url>").count(), 6);
        assert_eq!(xml.matches("</url>").count(), 6);

        let home = xml.find("<loc>https://example.com/</loc>").unwrap();
        let blog = xml.find("<loc>https://example.com/blog/hello</loc>").unwrap();
        let about = xml.find("<loc>https://example.com/about</loc>").unwrap();
        assert!(home < blog && blog < about);

        assert!(xml.contains("<loc>https://example.com/de/blog/hello</loc>"));
        assert!(xml.contains("<lastmod>2024-03-01</lastmod>"));
        assert!(xml.contains(r#"hreflang="x-default" href="https://example.com/about""#));
    }

    #[tokio::test]
    async fn test_fetch_with_bad_token_is_generic_500() {
        let fake = Arc::new(sample_site());
        let base_url = spawn_fake(fake).await;
        let server = SitemapServer::new(&app_config(&base_url));

        let response = post(
            server.router(),
            "/api/fetch-data",
            json!({ "apiKey": "wrong", "siteId": "site" }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body, json!({ "error": "Failed to fetch data" }));
    }

    #[tokio::test]
    async fn test_blank_credentials_make_no_requests() {
        let fake = Arc::new(sample_site());
        let base_url = spawn_fake(fake.clone()).await;
        let server = SitemapServer::new(&app_config(&base_url));

        let response = post(
            server.router(),
            "/api/fetch-data",
            json!({ "apiKey": "", "siteId": "site" }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(fake.requests().is_empty());
    }
}
