use anyhow::{Context, Result};
use charity_config::{CharityConfig, CharityConfigLoader, default_config_path};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "charity", version, about = "Retrieve the latest Annual Information Statement")]
pub struct Cli {
    /// YAML configuration file; defaults to ./charity.yaml when present.
    #[arg(long, global = true, env = "CHARITY_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API.
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Fetch one profile page and print the result as JSON.
    Fetch {
        url: String,
        /// Run Chrome without a window.
        #[arg(long)]
        headless: bool,
    },
}

impl Cli {
    /// Load configuration (env wins over the file) and apply flag overrides.
    pub fn load_config(&self) -> Result<CharityConfig> {
        let loader = match self.config.as_ref() {
            Some(path) => CharityConfigLoader::new().with_file(path),
            None => match default_config_path() {
                Some(path) => CharityConfigLoader::new().with_optional_file(path),
                None => CharityConfigLoader::new(),
            },
        };
        let mut cfg = loader.load().context("loading configuration")?;

        match &self.command {
            Command::Serve { host, port } => {
                if let Some(host) = host {
                    cfg.server.host = host.clone();
                }
                if let Some(port) = port {
                    cfg.server.port = *port;
                }
            }
            Command::Fetch { headless, .. } => cfg.browser.headless |= *headless,
        }
        Ok(cfg)
    }
}
