use crate::charity_browser::{
    launch::{build_launch_arguments, DriverOptions},
    page::CharityPage,
    probe::probe_webdriver,
};
use anyhow::{Context, Result};
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use std::collections::HashMap;
use webdriver::capabilities::Capabilities;

/// Thin wrapper around a `fantoccini` WebDriver client that owns one
/// browser session.
///
/// Call [`CharityDriver::close`] to end the session. If every clone of the
/// client is dropped without closing, fantoccini ends the session itself.
pub struct CharityDriver {
    client: Client,
}

impl CharityDriver {
    /// Start a new browser session through the configured WebDriver service.
    pub async fn launch(options: DriverOptions) -> Result<Self> {
        if options.probe {
            probe_webdriver(&options.webdriver_url, options.probe_timeout).await?;
        }

        let mut caps = Capabilities::new();
        let mut chrome_opts = HashMap::new();
        chrome_opts.insert("args".to_string(), json!(build_launch_arguments(&options)));
        caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&options.webdriver_url)
            .await
            .with_context(|| {
                format!("could not open a session on {}", options.webdriver_url)
            })?;

        tracing::info!(
            target: "browser.session",
            webdriver = %options.webdriver_url,
            headless = options.headless,
            "browser session started"
        );

        Ok(Self { client })
    }

    /// Page handle bound to this session's current window.
    pub fn page(&self) -> CharityPage {
        CharityPage::new(self.client.clone())
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<()> {
        self.client
            .close()
            .await
            .context("webdriver refused to close the session")?;
        tracing::info!(target: "browser.session", "browser session closed");
        Ok(())
    }
}
