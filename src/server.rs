//! HTTP service
//!
//! Exposes the aggregator and the sitemap synthesizer over a small JSON API.
//!
//! # Routes
//!
//! - `GET /health` - Liveness check
//! - `POST /api/fetch-data` - Aggregate a site (body: `{"apiKey": "...", "siteId": "..."}`)
//! - `POST /api/generate-sitemap` - Render a sitemap from a selection and
//!   previously fetched collection URLs
//!
//! # Example
//!
//! ```no_run
//! use webflow_sitemap::config::AppConfig;
//! use webflow_sitemap::server::SitemapServer;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::new();
//!     let server = SitemapServer::new(&config);
//!
//!     server.run(&config.server.addr).await.expect("Server failed");
//! }
//! ```

use crate::aggregator::{aggregate_site, AggregatorConfig, SiteData};
use crate::cms::{CmsConnector, WebflowConnector};
use crate::config::AppConfig;
use crate::sitemap::{CollectionUrls, SitemapRequest};
use crate::SitemapError;
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

/// Message returned for any failure while talking to the CMS
pub const FETCH_FAILED: &str = "Failed to fetch data";

/// Message returned when a request body is not valid JSON of the expected shape
pub const INVALID_BODY: &str = "Invalid request body";

/// Server error types
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Bind error: {0}")]
    Bind(String),
}

/// Shared server state
struct AppState {
    connector: Arc<dyn CmsConnector>,
    aggregator: AggregatorConfig,
    max_body_size: usize,
}

/// HTTP server for sitemap generation
pub struct SitemapServer {
    state: Arc<AppState>,
}

impl SitemapServer {
    /// Create a server that talks to the Webflow API configured in `config`
    pub fn new(config: &AppConfig) -> Self {
        Self::with_connector(Arc::new(WebflowConnector::new(config.cms.clone())), config)
    }

    /// Create a server backed by a custom CMS connector
    pub fn with_connector(connector: Arc<dyn CmsConnector>, config: &AppConfig) -> Self {
        Self {
            state: Arc::new(AppState {
                connector,
                aggregator: AggregatorConfig::from(&config.cms),
                max_body_size: config.server.max_body_size,
            }),
        }
    }

    /// Build the router with CORS and body limit layers
    pub fn router(&self) -> Router {
        let max_body_size = self.state.max_body_size;

        Router::new()
            .route("/health", get(health))
            .route("/api/fetch-data", post(fetch_data))
            .route("/api/generate-sitemap", post(generate_sitemap))
            .layer(DefaultBodyLimit::max(max_body_size))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Run the server on the given address
    pub async fn run(self, addr: &str) -> Result<(), ServerError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(format!("{}: {}", addr, e)))?;

        tracing::info!(
            addr = addr,
            max_body_size = self.state.max_body_size,
            page_size = self.state.aggregator.page_size,
            "Sitemap server listening"
        );

        axum::serve(listener, self.router())
            .await
            .map_err(ServerError::Io)
    }
}

// ============================================================================
// Request/Response types
// ============================================================================

/// Request to aggregate a site
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchDataRequest {
    /// `null` and a missing field are both treated as blank
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub site_id: Option<String>,
}

/// Request to render a sitemap
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSitemapRequest {
    #[serde(flatten)]
    pub sitemap: SitemapRequest,

    /// Item URLs per collection slug, as returned by `/api/fetch-data`
    #[serde(default)]
    pub collection_items: CollectionUrls,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

/// Unwrap a JSON body, answering 400 `{error}` when it cannot be decoded
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value).map_err(|rejection| {
        tracing::warn!(
            status = %rejection.status(),
            error = %rejection.body_text(),
            "Rejected request body"
        );
        match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => {
                error_response(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
            }
            _ => error_response(StatusCode::BAD_REQUEST, INVALID_BODY),
        }
    })
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn fetch_data(
    State(state): State<Arc<AppState>>,
    body: Result<Json<FetchDataRequest>, JsonRejection>,
) -> Result<Json<SiteData>, ApiError> {
    let req = json_body(body)?;
    let api_key = req.api_key.as_deref().unwrap_or_default();
    let site_id = req.site_id.as_deref().unwrap_or_default();

    let site_data = aggregate_site(
        state.connector.as_ref(),
        api_key,
        site_id,
        state.aggregator.clone(),
    )
    .await
    .map_err(|e| match e {
        SitemapError::Validation(message) => error_response(StatusCode::BAD_REQUEST, message),
        other => {
            // Details stay in the log, the caller gets a generic message
            tracing::error!(site_id = %site_id, error = %other, "Error fetching data");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, FETCH_FAILED)
        }
    })?;

    tracing::info!(
        site_id = %site_id,
        static_pages = site_data.static_pages.len(),
        collections = site_data.collections.len(),
        "Fetched site data"
    );

    Ok(Json(site_data))
}

async fn generate_sitemap(
    body: Result<Json<GenerateSitemapRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = json_body(body)?;
    let xml = req
        .sitemap
        .generate(&req.collection_items)
        .map_err(|e| match e {
            SitemapError::Validation(message) => error_response(StatusCode::BAD_REQUEST, message),
            other => {
                tracing::error!(error = %other, "Error generating sitemap");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to generate sitemap",
                )
            }
        })?;

    tracing::info!(
        base_url = %req.sitemap.base_url,
        static_entries = req.sitemap.selected_static_entries.len(),
        collections = req.sitemap.selected_collections.len(),
        "Generated sitemap"
    );

    Ok(([(header::CONTENT_TYPE, "application/xml")], xml))
}
