use crate::charity_browser::{
    idle::{IdlePolicy, IdleTracker, PageActivity, ACTIVITY_SCRIPT},
    locate,
};
use anyhow::{anyhow, Result};
use charity_common::FetchError;
use fantoccini::{
    elements::Element,
    error::{CmdError, ErrorStatus},
    wd::TimeoutConfiguration,
    Client, Locator,
};
use std::time::{Duration, Instant};
use tokio::time::{sleep, timeout};
use tracing::debug;

/// Slack on top of the WebDriver page-load timeout before the local bound fires.
const NAVIGATION_GRACE: Duration = Duration::from_secs(2);

/// WebDriver timeouts carrying only the page-load bound.
fn page_load_timeouts(limit: Duration) -> TimeoutConfiguration {
    TimeoutConfiguration::new(None, Some(limit), None)
}

/// Local bound on a navigation: the page-load limit plus grace.
fn navigation_bound(limit: Duration) -> Duration {
    limit.saturating_add(NAVIGATION_GRACE)
}

/// `None` when `timeout` is too large to represent, meaning no deadline.
fn idle_deadline(started: Instant, timeout: Duration) -> Option<Instant> {
    started.checked_add(timeout)
}

/// Page wrapper providing the lookups and waits document retrieval needs.
///
/// Failures that belong to a specific class are raised as [`FetchError`]
/// inside the `anyhow::Error`, so callers can `downcast` them.
#[derive(Clone)]
pub struct CharityPage {
    pub(crate) client: Client,
}

impl CharityPage {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Navigate to `url`, failing with [`FetchError::NavigationTimeout`] once
    /// `limit` has passed.
    pub async fn goto(&self, url: &str, limit: Duration) -> Result<()> {
        let timed_out = || FetchError::NavigationTimeout {
            url: url.to_string(),
            timeout: limit,
        };

        if let Err(err) = self.client.update_timeouts(page_load_timeouts(limit)).await {
            debug!(target: "browser.page", error = %err, "page load timeout not accepted");
        }

        match timeout(navigation_bound(limit), self.client.goto(url)).await {
            Err(_) => Err(timed_out().into()),
            Ok(Err(CmdError::Standard(wd))) if wd.error == ErrorStatus::Timeout => {
                Err(timed_out().into())
            }
            Ok(Err(err)) => Err(FetchError::Navigation {
                url: url.to_string(),
                reason: err.to_string(),
            }
            .into()),
            Ok(Ok(())) => {
                debug!(target: "browser.page", %url, "navigation complete");
                Ok(())
            }
        }
    }

    /// Rendered elements with role `link` whose accessible name is exactly
    /// `name`.
    ///
    /// Waits up to `patience` for the first match to be attached, since the
    /// link may be injected after the load event. Hidden copies (collapsed
    /// menus and the like) are left out.
    pub async fn find_links_named(
        &self,
        name: &str,
        patience: Duration,
    ) -> Result<Vec<CharityElement>> {
        let xpath = locate::link_by_name(name);
        if !self.wait_for_xpath(&xpath, patience).await? {
            debug!(target: "browser.page", %name, "link never appeared");
            return Ok(Vec::new());
        }

        let mut shown = Vec::new();
        for link in self.find_xpath(&xpath).await? {
            if link.is_displayed().await? {
                shown.push(link);
            }
        }
        Ok(shown)
    }

    /// All elements whose `title` contains `fragment`, ignoring ASCII case.
    pub async fn find_titled(&self, fragment: &str) -> Result<Vec<CharityElement>> {
        self.find_xpath(&locate::title_contains(fragment)).await
    }

    /// `false` when nothing matched `xpath` within `patience`.
    async fn wait_for_xpath(&self, xpath: &str, patience: Duration) -> Result<bool> {
        match self
            .client
            .wait()
            .at_most(patience)
            .for_element(Locator::XPath(xpath))
            .await
        {
            Ok(_) => Ok(true),
            Err(CmdError::WaitTimeout) => Ok(false),
            Err(e) => Err(anyhow!(FetchError::Element(e.to_string()))),
        }
    }

    async fn find_xpath(&self, xpath: &str) -> Result<Vec<CharityElement>> {
        let elements = self
            .client
            .find_all(Locator::XPath(xpath))
            .await
            .map_err(|e| anyhow!(FetchError::Element(e.to_string())))?;
        debug!(target: "browser.page", %xpath, count = elements.len(), "xpath lookup");
        Ok(elements.into_iter().map(CharityElement::new).collect())
    }

    /// Return the full page HTML source.
    pub async fn content(&self) -> Result<String> {
        self.client
            .source()
            .await
            .map_err(|e| anyhow!(FetchError::Capture(e.to_string())))
    }

    /// Return the current page URL.
    pub async fn url(&self) -> Result<String> {
        self.client
            .current_url()
            .await
            .map(|url| url.to_string())
            .map_err(anyhow::Error::msg)
    }

    /// Block until the page is loaded and its resource count has been stable
    /// for `policy.quiet`, or fail with [`FetchError::NetworkIdleTimeout`].
    pub async fn wait_for_network_idle(&self, policy: IdlePolicy) -> Result<()> {
        let started = Instant::now();
        let deadline = idle_deadline(started, policy.timeout);
        let mut tracker = IdleTracker::new(policy.quiet);

        loop {
            match self.sample_activity().await {
                Some(activity) => {
                    if tracker.observe(&activity, Instant::now()) {
                        debug!(
                            target: "browser.idle",
                            waited_ms = started.elapsed().as_millis() as u64,
                            resources = activity.resource_count,
                            "network idle"
                        );
                        return Ok(());
                    }
                }
                // Mid-navigation the script can fail; treat it as busy.
                None => tracker.reset(),
            }

            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Err(FetchError::NetworkIdleTimeout(policy.timeout).into());
            }
            sleep(policy.poll).await;
        }
    }

    async fn sample_activity(&self) -> Option<PageActivity> {
        match self.client.execute(ACTIVITY_SCRIPT, vec![]).await {
            Ok(value) => PageActivity::from_script_value(&value),
            Err(err) => {
                debug!(target: "browser.idle", error = %err, "activity sample failed");
                None
            }
        }
    }
}

/// Wrapper for DOM elements returned by [`CharityPage`] lookups.
#[derive(Clone)]
pub struct CharityElement {
    pub element: Element,
}

impl CharityElement {
    pub fn new(element: Element) -> Self {
        Self { element }
    }

    /// Read an attribute value.
    pub async fn attribute(&self, attribute: &str) -> Result<Option<String>> {
        self.element
            .attr(attribute)
            .await
            .map_err(|e| anyhow!(FetchError::Element(e.to_string())))
    }

    pub async fn is_displayed(&self) -> Result<bool> {
        self.element
            .is_displayed()
            .await
            .map_err(|e| anyhow!(FetchError::Element(e.to_string())))
    }

    pub async fn click(&self) -> Result<()> {
        self.element
            .click()
            .await
            .map_err(|e| anyhow!(FetchError::Element(format!("click failed: {e}"))))
    }
}
