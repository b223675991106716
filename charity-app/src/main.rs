use anyhow::Result;
use charity_app::cli::{Cli, Command};
use charity_app::server::{self, AppState};
use charity_app::{build_fetcher, logging};
use charity_web::RetrievalResult;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = cli.load_config()?;

    let log_dir = logging::init(&cfg.logging)?;
    tracing::debug!(target: "app", log_dir = %log_dir.display(), "logging initialised");

    let fetcher = build_fetcher(&cfg);
    match cli.command {
        Command::Serve { .. } => {
            let state = AppState::new(fetcher);
            server::start(&cfg.server.host, cfg.server.port, state).await
        }
        Command::Fetch { url, .. } => {
            let result: RetrievalResult = fetcher.fetch(&url).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
    }
}
