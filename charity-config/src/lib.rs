//! Loader for workspace configuration with YAML + environment overlays.
//!
//! Sources are merged in this order, later sources winning:
//!
//! 1. serde defaults (an empty configuration is valid)
//! 2. YAML files / inline YAML, in the order they were attached
//! 3. `CHARITY__<SECTION>__<KEY>` environment variables
//!
//! `${VAR}` placeholders in string values are expanded after merging.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const CONFIG_FILE_NAME: &str = "charity.yaml";

pub use charity_common::DEFAULT_USER_AGENT;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CharityConfig {
    pub server: ServerSettings,
    pub browser: BrowserSettings,
    pub fetch: FetchSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5000,
        }
    }
}

/// How browser sessions are launched.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// WebDriver endpoint (chromedriver by default).
    pub webdriver_url: String,
    pub headless: bool,
    pub user_agent: String,
    pub window_width: u32,
    pub window_height: u32,
    /// Ask the WebDriver service for `/status` before requesting a session.
    pub probe_webdriver: bool,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".into(),
            headless: false,
            user_agent: DEFAULT_USER_AGENT.into(),
            window_width: 1920,
            window_height: 1080,
            probe_webdriver: true,
        }
    }
}

/// Timeouts and UI markers for the document traversal.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub navigation_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub idle_quiet_ms: u64,
    pub idle_poll_ms: u64,
    /// How long the documents link may take to appear after navigation.
    pub element_wait_secs: u64,
    pub link_name: String,
    pub title_marker: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            navigation_timeout_secs: 60,
            idle_timeout_secs: 30,
            idle_quiet_ms: 500,
            idle_poll_ms: 100,
            element_wait_secs: 30,
            link_name: "Financials & Documents".into(),
            title_marker: "View Annual Information Statement".into(),
        }
    }
}

impl FetchSettings {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn idle_quiet(&self) -> Duration {
        Duration::from_millis(self.idle_quiet_ms)
    }

    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms)
    }

    pub fn element_wait(&self) -> Duration {
        Duration::from_secs(self.element_wait_secs)
    }
}

/// Output encoding for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Where and how the binary logs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub format: LogFormat,
    /// Log directory; `~` is expanded. Falls back to `CHARITY_LOG_DIR`,
    /// then the platform data directory.
    pub dir: Option<PathBuf>,
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub filter: String,
    /// Mirror events to stderr as well as the log file.
    pub emit_stderr: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            dir: None,
            filter: "info".into(),
            emit_stderr: true,
        }
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Locate a configuration file when none was given on the command line.
///
/// Looks for `./charity.yaml`, then `<config_dir>/charity/charity.yaml`.
pub fn default_config_path() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join("charity").join(CONFIG_FILE_NAME))
        .filter(|p| p.is_file())
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct CharityConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for CharityConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CharityConfigLoader {
    /// Start from defaults; environment overrides are applied at [`load`](Self::load).
    ///
    /// ```
    /// use charity_config::CharityConfigLoader;
    ///
    /// let config = CharityConfigLoader::new().load().expect("defaults are valid");
    /// assert_eq!(config.server.port, 5000);
    /// assert_eq!(config.fetch.navigation_timeout_secs, 60);
    /// assert!(!config.browser.headless);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is skipped when absent, so deployments can rely
    /// purely on environment variables.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    ///
    /// ```
    /// use charity_config::CharityConfigLoader;
    ///
    /// let cfg = CharityConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// browser:
    ///   headless: true
    /// fetch:
    ///   navigation_timeout_secs: 15
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(cfg.browser.headless);
    /// assert_eq!(cfg.fetch.navigation_timeout_secs, 15);
    /// assert_eq!(cfg.fetch.link_name, "Financials & Documents");
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// ```
    /// use charity_config::CharityConfigLoader;
    ///
    /// unsafe { std::env::set_var("DRIVER_HOST", "grid.internal"); }
    ///
    /// let config = CharityConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// browser:
    ///   webdriver_url: "http://${DRIVER_HOST}:4444"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.browser.webdriver_url, "http://grid.internal:4444");
    ///
    /// unsafe { std::env::remove_var("DRIVER_HOST"); }
    /// ```
    pub fn load(self) -> Result<CharityConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("CHARITY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: CharityConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}
