use charity_common::DEFAULT_USER_AGENT;
use std::time::Duration;

/// Everything needed to start one browser session.
#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// WebDriver endpoint, e.g. chromedriver on `http://localhost:9515`.
    pub webdriver_url: String,
    pub headless: bool,
    pub user_agent: String,
    pub viewport: (u32, u32),
    /// Query `<webdriver_url>/status` before asking for a session.
    pub probe: bool,
    pub probe_timeout: Duration,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            headless: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            viewport: (1920, 1080),
            probe: true,
            probe_timeout: Duration::from_secs(5),
        }
    }
}

/// Construct Chrome command‑line arguments for a session.
///
/// Every session runs in a fresh incognito context with the configured
/// user agent. A window is shown unless `headless` is set.
pub fn build_launch_arguments(options: &DriverOptions) -> Vec<String> {
    let mut args = vec![
        "--disable-blink-features=AutomationControlled".to_string(),
        "--disable-infobars".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--no-first-run".to_string(),
        "--incognito".to_string(),
        format!("--user-agent={}", options.user_agent),
        format!("--window-size={},{}", options.viewport.0, options.viewport.1),
    ];
    if options.headless {
        args.push("--headless=new".to_string());
        args.push("--disable-gpu".to_string());
    }
    args
}
