//! HTTP surface for the fetcher.
//!
//! `POST /api/request` runs one retrieval and stores it as the latest
//! result, which `GET /api/status` and `GET /api/data` then report on.
//! Each request drives its own browser session; only the latest-result slot
//! is shared.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use charity_web::{DocumentFetcher, RetrievalOutcome, SessionLauncher};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// The latest retrieval, as served by `GET /api/data`.
#[derive(Debug, Clone, Serialize)]
pub struct StoredReport {
    pub content: String,
    pub year: Option<i32>,
    pub outcome: &'static str,
    pub checksum: Option<String>,
}

impl From<&RetrievalOutcome> for StoredReport {
    fn from(outcome: &RetrievalOutcome) -> Self {
        let result = outcome.to_result();
        Self {
            content: result.content,
            year: result.year,
            outcome: outcome.label(),
            checksum: outcome.checksum().map(str::to_string),
        }
    }
}

pub struct AppState<L> {
    fetcher: DocumentFetcher<L>,
    latest: RwLock<Option<StoredReport>>,
}

impl<L: SessionLauncher> AppState<L> {
    pub fn new(fetcher: DocumentFetcher<L>) -> Arc<Self> {
        Arc::new(Self {
            fetcher,
            latest: RwLock::new(None),
        })
    }

    pub async fn latest(&self) -> Option<StoredReport> {
        self.latest.read().await.clone()
    }
}

#[derive(Debug, Deserialize)]
struct ScrapeRequest {
    url: Option<String>,
}

pub fn router<L: SessionLauncher + 'static>(state: Arc<AppState<L>>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/request", post(request::<L>))
        .route("/api/status", get(status::<L>))
        .route("/api/data", get(data::<L>))
        .with_state(state)
}

/// Serve until Ctrl-C.
pub async fn start<L: SessionLauncher + 'static>(
    host: &str,
    port: u16,
    state: Arc<AppState<L>>,
) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!(target: "server", addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!(target: "server", error = %err, "ctrl-c handler failed");
            }
        })
        .await?;
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn request<L: SessionLauncher + 'static>(
    State(state): State<Arc<AppState<L>>>,
    body: Option<Json<ScrapeRequest>>,
) -> Response {
    let url = body
        .and_then(|Json(req)| req.url)
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty());
    let Some(url) = url else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "URL is required" })),
        )
            .into_response();
    };

    let outcome = state.fetcher.fetch_outcome(&url).await;
    let report = StoredReport::from(&outcome);
    let year = report.year;
    *state.latest.write().await = Some(report);

    Json(json!({
        "message": "Data scraping completed",
        "outcome": outcome.label(),
        "year": year,
    }))
    .into_response()
}

async fn status<L: SessionLauncher + 'static>(
    State(state): State<Arc<AppState<L>>>,
) -> Json<serde_json::Value> {
    let ready = state.latest.read().await.is_some();
    Json(json!({ "status": if ready { "ready" } else { "not ready" } }))
}

async fn data<L: SessionLauncher + 'static>(State(state): State<Arc<AppState<L>>>) -> Response {
    match state.latest().await {
        Some(report) => Json(report).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "No data available" })),
        )
            .into_response(),
    }
}
