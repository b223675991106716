//! Wiring for the `charity` binary: configuration to fetcher, plus the HTTP
//! surface that hosts it.

pub mod cli;
pub mod logging;
pub mod server;

use charity_config::{BrowserSettings, CharityConfig, FetchSettings};
use charity_drivers::charity_browser::idle::IdlePolicy;
use charity_drivers::charity_browser::launch::DriverOptions;
use charity_web::browser::FantocciniLauncher;
use charity_web::{DocumentFetcher, FetchPlan, TitleMatcher};

pub fn driver_options(browser: &BrowserSettings) -> DriverOptions {
    DriverOptions {
        webdriver_url: browser.webdriver_url.clone(),
        headless: browser.headless,
        user_agent: browser.user_agent.clone(),
        viewport: (browser.window_width, browser.window_height),
        probe: browser.probe_webdriver,
        ..DriverOptions::default()
    }
}

pub fn idle_policy(fetch: &FetchSettings) -> IdlePolicy {
    IdlePolicy {
        timeout: fetch.idle_timeout(),
        quiet: fetch.idle_quiet(),
        poll: fetch.idle_poll(),
    }
}

pub fn fetch_plan(fetch: &FetchSettings) -> FetchPlan {
    FetchPlan {
        link_name: fetch.link_name.clone(),
        titles: TitleMatcher::new(fetch.title_marker.clone()),
        navigation_timeout: fetch.navigation_timeout(),
    }
}

/// A fetcher that opens a real Chrome session per call.
pub fn build_fetcher(cfg: &CharityConfig) -> DocumentFetcher<FantocciniLauncher> {
    let launcher = FantocciniLauncher::new(
        driver_options(&cfg.browser),
        idle_policy(&cfg.fetch),
        cfg.fetch.element_wait(),
    );
    DocumentFetcher::new(launcher, fetch_plan(&cfg.fetch))
}
