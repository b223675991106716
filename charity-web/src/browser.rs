use crate::select::TitleMatcher;
use crate::session::{BrowserSession, SessionLauncher};
use charity_common::{FetchError, Result};
use charity_drivers::charity_browser::driver::CharityDriver;
use charity_drivers::charity_browser::idle::IdlePolicy;
use charity_drivers::charity_browser::launch::DriverOptions;
use charity_drivers::charity_browser::page::{CharityElement, CharityPage};
use std::time::Duration;
use url::Url;

/// Keep a typed [`FetchError`] raised by the driver, otherwise wrap the
/// message in the class chosen by the caller.
fn classify(err: anyhow::Error, fallback: impl FnOnce(String) -> FetchError) -> FetchError {
    match err.downcast::<FetchError>() {
        Ok(typed) => typed,
        Err(other) => fallback(format!("{other:#}")),
    }
}

/// Launches Chrome sessions through a WebDriver service.
#[derive(Debug, Clone)]
pub struct FantocciniLauncher {
    pub options: DriverOptions,
    pub idle: IdlePolicy,
    /// How long to wait for the documents link to be attached.
    pub element_wait: Duration,
}

impl FantocciniLauncher {
    pub fn new(options: DriverOptions, idle: IdlePolicy, element_wait: Duration) -> Self {
        Self {
            options,
            idle,
            element_wait,
        }
    }
}

#[async_trait::async_trait]
impl SessionLauncher for FantocciniLauncher {
    type Session = FantocciniSession;

    async fn launch(&self) -> Result<FantocciniSession> {
        let driver = CharityDriver::launch(self.options.clone())
            .await
            .map_err(|e| classify(e, FetchError::SessionLaunch))?;
        let page = driver.page();
        Ok(FantocciniSession {
            driver,
            page,
            idle: self.idle,
            element_wait: self.element_wait,
        })
    }
}

/// One live browser session.
pub struct FantocciniSession {
    driver: CharityDriver,
    page: CharityPage,
    idle: IdlePolicy,
    element_wait: Duration,
}

#[async_trait::async_trait]
impl BrowserSession for FantocciniSession {
    type Element = CharityElement;

    async fn goto(&mut self, url: &Url, timeout: Duration) -> Result<()> {
        self.page
            .goto(url.as_str(), timeout)
            .await
            .map_err(|e| {
                classify(e, |reason| FetchError::Navigation {
                    url: url.to_string(),
                    reason,
                })
            })
    }

    async fn find_links(&mut self, name: &str) -> Result<Vec<CharityElement>> {
        self.page
            .find_links_named(name, self.element_wait)
            .await
            .map_err(|e| classify(e, FetchError::Element))
    }

    async fn find_titled(&mut self, matcher: &TitleMatcher) -> Result<Vec<CharityElement>> {
        self.page
            .find_titled(matcher.marker())
            .await
            .map_err(|e| classify(e, FetchError::Element))
    }

    async fn title_of(&mut self, element: &CharityElement) -> Result<Option<String>> {
        element
            .attribute("title")
            .await
            .map_err(|e| classify(e, FetchError::Element))
    }

    async fn click(&mut self, element: &CharityElement) -> Result<()> {
        element
            .click()
            .await
            .map_err(|e| classify(e, FetchError::Element))
    }

    async fn wait_for_network_idle(&mut self) -> Result<()> {
        self.page
            .wait_for_network_idle(self.idle)
            .await
            .map_err(|e| classify(e, FetchError::Element))
    }

    async fn content(&mut self) -> Result<String> {
        if let Ok(url) = self.page.url().await {
            tracing::debug!(target: "fetch", %url, "capturing page");
        }
        self.page
            .content()
            .await
            .map_err(|e| classify(e, FetchError::Capture))
    }

    async fn close(self) -> Result<()> {
        self.driver
            .close()
            .await
            .map_err(|e| classify(e, FetchError::SessionClose))
    }
}
