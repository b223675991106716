use anyhow::{bail, Context, Result};
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    value: WebDriverStatus,
}

/// Body of the W3C `GET /status` endpoint.
#[derive(Debug, Deserialize)]
pub struct WebDriverStatus {
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub message: String,
}

/// `<webdriver_url>/status`, keeping any path prefix such as `/wd/hub`.
fn status_endpoint(webdriver_url: &str) -> Result<Url> {
    let base = Url::parse(&format!("{}/", webdriver_url.trim_end_matches('/')))
        .with_context(|| format!("invalid webdriver url {webdriver_url:?}"))?;
    Ok(base.join("status")?)
}

/// Ask a WebDriver service whether it can create new sessions.
///
/// Fails when the service is unreachable, answers with an error status or
/// reports `ready: false`.
pub async fn probe_webdriver(webdriver_url: &str, timeout: Duration) -> Result<WebDriverStatus> {
    let endpoint = status_endpoint(webdriver_url)?;
    let client = reqwest::Client::builder().timeout(timeout).build()?;

    let response = client
        .get(endpoint)
        .send()
        .await
        .with_context(|| format!("webdriver at {webdriver_url} is unreachable"))?;
    let http_status = response.status();
    if !http_status.is_success() {
        bail!("webdriver at {webdriver_url} answered {http_status} on /status");
    }
    let envelope: StatusEnvelope = response
        .json()
        .await
        .with_context(|| format!("webdriver at {webdriver_url} sent an unreadable status"))?;

    let status = envelope.value;
    if !status.ready {
        bail!(
            "webdriver at {webdriver_url} is not ready: {}",
            if status.message.is_empty() {
                "no message"
            } else {
                status.message.as_str()
            }
        );
    }
    tracing::debug!(target: "browser.probe", %webdriver_url, message = %status.message, "webdriver ready");
    Ok(status)
}
