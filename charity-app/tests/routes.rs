use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use charity_app::server::{AppState, router};
use charity_common::{FetchError, Result};
use charity_web::{BrowserSession, DocumentFetcher, FetchPlan, SessionLauncher, TitleMatcher};
use serde_json::{Value, json};
use std::time::Duration;
use tower::ServiceExt;
use url::Url;

const MARKUP: &str = "<html>AIS 2021</html>";

/// A profile page listing fixed statement titles.
#[derive(Clone)]
struct FixedPage {
    titles: Vec<&'static str>,
    launch_fails: bool,
}

struct FixedSession {
    titles: Vec<&'static str>,
}

#[async_trait]
impl SessionLauncher for FixedPage {
    type Session = FixedSession;

    async fn launch(&self) -> Result<FixedSession> {
        if self.launch_fails {
            return Err(FetchError::SessionLaunch("connection refused".into()));
        }
        Ok(FixedSession {
            titles: self.titles.clone(),
        })
    }
}

#[async_trait]
impl BrowserSession for FixedSession {
    type Element = usize;

    async fn goto(&mut self, _url: &Url, _timeout: Duration) -> Result<()> {
        Ok(())
    }

    async fn find_links(&mut self, _name: &str) -> Result<Vec<usize>> {
        Ok(vec![usize::MAX])
    }

    async fn find_titled(&mut self, _matcher: &TitleMatcher) -> Result<Vec<usize>> {
        Ok((0..self.titles.len()).collect())
    }

    async fn title_of(&mut self, element: &usize) -> Result<Option<String>> {
        Ok(self.titles.get(*element).map(|t| t.to_string()))
    }

    async fn click(&mut self, _element: &usize) -> Result<()> {
        Ok(())
    }

    async fn wait_for_network_idle(&mut self) -> Result<()> {
        Ok(())
    }

    async fn content(&mut self) -> Result<String> {
        Ok(MARKUP.to_string())
    }

    async fn close(self) -> Result<()> {
        Ok(())
    }
}

fn app(titles: Vec<&'static str>, launch_fails: bool) -> axum::Router {
    let fetcher = DocumentFetcher::new(
        FixedPage {
            titles,
            launch_fails,
        },
        FetchPlan::default(),
    );
    router(AppState::new(fetcher))
}

async fn call(app: &axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn get(path: &str) -> Request<Body> {
    Request::get(path).body(Body::empty()).unwrap()
}

fn post_json(path: &str, body: Value) -> Request<Body> {
    Request::post(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let app = app(vec![], false);
    let (status, body) = call(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn nothing_stored_before_first_request() {
    let app = app(vec![], false);

    let (_, body) = call(&app, get("/api/status")).await;
    assert_eq!(body, json!({ "status": "not ready" }));

    let (status, body) = call(&app, get("/api/data")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "No data available" }));
}

#[tokio::test]
async fn request_stores_the_latest_statement() {
    let app = app(
        vec![
            "View Annual Information Statement 2020",
            "View Annual Information Statement 2021",
        ],
        false,
    );

    let (status, body) = call(
        &app,
        post_json("/api/request", json!({ "url": "https://example.org/profile" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "message": "Data scraping completed", "outcome": "found", "year": 2021 })
    );

    let (_, body) = call(&app, get("/api/status")).await;
    assert_eq!(body, json!({ "status": "ready" }));

    let (status, body) = call(&app, get("/api/data")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], MARKUP);
    assert_eq!(body["year"], 2021);
    assert_eq!(body["outcome"], "found");
    assert_eq!(
        body["checksum"],
        blake3_hex(MARKUP),
        "checksum is the digest of the stored markup"
    );
}

#[tokio::test]
async fn no_statement_is_stored_as_not_found() {
    let app = app(vec!["View Annual Information Statement"], false);

    let (_, body) = call(
        &app,
        post_json("/api/request", json!({ "url": "https://example.org/profile" })),
    )
    .await;
    assert_eq!(body["outcome"], "not_found");
    assert_eq!(body["year"], Value::Null);

    let (_, body) = call(&app, get("/api/data")).await;
    assert_eq!(body["content"], "Error: No AIS found");
    assert_eq!(body["checksum"], Value::Null);
}

#[tokio::test]
async fn failures_are_stored_with_error_content() {
    let app = app(vec![], true);

    let (status, body) = call(
        &app,
        post_json("/api/request", json!({ "url": "https://example.org/profile" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "failed");

    let (_, body) = call(&app, get("/api/data")).await;
    assert_eq!(body["content"], "Error: browser launch failed: connection refused");
    assert_eq!(body["year"], Value::Null);
}

#[tokio::test]
async fn request_without_url_is_rejected() {
    let app = app(vec![], false);

    for payload in [json!({}), json!({ "url": "   " })] {
        let (status, body) = call(&app, post_json("/api/request", payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "URL is required" }));
    }

    let bare = Request::post("/api/request").body(Body::empty()).unwrap();
    let (status, _) = call(&app, bare).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = call(&app, get("/api/status")).await;
    assert_eq!(body, json!({ "status": "not ready" }));
}

fn blake3_hex(s: &str) -> Value {
    Value::String(blake3::hash(s.as_bytes()).to_hex().to_string())
}
