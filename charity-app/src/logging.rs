//! Process-wide `tracing` setup for the `charity` binary.
//!
//! Events go to a daily rotated `charity.<date>.log` file through a
//! non-blocking writer and, unless disabled, to stderr as well. `RUST_LOG`
//! takes precedence over the configured filter.

use anyhow::Context;
use charity_config::{LogFormat, LoggingSettings};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

const LOG_PREFIX: &str = "charity";
const LOG_SUFFIX: &str = "log";
const LOG_DIR_ENV: &str = "CHARITY_LOG_DIR";

/// Flushes the file writer on drop, so it lives as long as the process.
static FILE_SINK: OnceLock<(WorkerGuard, PathBuf)> = OnceLock::new();

type Stack = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<Stack> + Send + Sync>;

/// Install the global subscriber and return the directory logs rotate in.
///
/// Only the first call installs anything; later calls return the directory
/// chosen then.
pub fn init(settings: &LoggingSettings) -> anyhow::Result<PathBuf> {
    if let Some((_, dir)) = FILE_SINK.get() {
        return Ok(dir.clone());
    }

    let dir = log_dir(
        settings.dir.as_deref(),
        std::env::var_os(LOG_DIR_ENV).map(PathBuf::from),
    );
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("cannot create log directory {}", dir.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_PREFIX)
        .filename_suffix(LOG_SUFFIX)
        .build(&dir)
        .with_context(|| format!("cannot open a log file in {}", dir.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let mut sinks = vec![event_layer(settings.format, writer, false)];
    if settings.emit_stderr {
        sinks.push(event_layer(settings.format, std::io::stderr, true));
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.filter))
        .with_context(|| format!("invalid log filter {:?}", settings.filter))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(sinks)
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    let _ = FILE_SINK.set((guard, dir.clone()));
    Ok(dir)
}

fn event_layer<W>(format: LogFormat, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Text => fmt::layer().with_writer(writer).with_ansi(ansi).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
    }
}

/// Configured directory, else `$CHARITY_LOG_DIR`, else
/// `<data_local_dir>/charity`. A leading `~` is expanded.
fn log_dir(configured: Option<&Path>, from_env: Option<PathBuf>) -> PathBuf {
    match configured.map(Path::to_path_buf).or(from_env) {
        Some(dir) => expand_tilde(&dir),
        None => dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(LOG_PREFIX),
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(raw) => PathBuf::from(shellexpand::tilde(raw).into_owned()),
        None => path.to_path_buf(),
    }
}
