//! Common types shared across the charity crates.
//!
//! This crate defines the failure taxonomy for document retrieval and the
//! identity every browser session presents. It is intentionally
//! dependency‑minimal so that every crate can depend on it.
//!
//! # Overview
//!
//! - [`FetchError`] and [`Result`]: failures raised while driving a browser
//! - [`FailureKind`]: the coarse class a [`FetchError`] belongs to
//! - [`DEFAULT_USER_AGENT`]: the fixed desktop user agent
//!
//! # Examples
//!
//! ```rust
//! use charity_common::{FailureKind, FetchError};
//!
//! let err = FetchError::LinkNotFound { name: "Financials & Documents".into() };
//! assert_eq!(err.kind(), FailureKind::ElementResolution);
//! assert_eq!(err.to_string(), "no link named \"Financials & Documents\" found");
//! ```
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Desktop identification string presented by every browser session.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Coarse classification of a [`FetchError`].
///
/// "No qualifying document" is deliberately absent: it is an outcome, not a
/// failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The target page was unreachable, or a page load / idle wait ran out of time.
    Navigation,
    /// A required element could not be resolved, read, or activated.
    ElementResolution,
    /// The browser session could not be launched or closed.
    SessionLifecycle,
}

/// Errors raised while retrieving a document through a browser session.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// The address handed to the fetcher is not an absolute URL.
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The page load did not finish within the navigation bound.
    #[error("navigation to {url} timed out after {}s", .timeout.as_secs())]
    NavigationTimeout { url: String, timeout: Duration },

    /// The driver reported an error while loading the page.
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// The network never went quiet within the idle bound.
    #[error("network idle not reached within {}ms", .0.as_millis())]
    NetworkIdleTimeout(Duration),

    /// No link carries the requested accessible name.
    #[error("no link named {name:?} found")]
    LinkNotFound { name: String },

    /// More than one link carries the requested accessible name.
    #[error("link name {name:?} resolved to {count} elements")]
    AmbiguousLink { name: String, count: usize },

    /// Element lookup, attribute read, or click failed.
    #[error("element lookup failed: {0}")]
    Element(String),

    /// The rendered markup could not be read back.
    #[error("page capture failed: {0}")]
    Capture(String),

    /// The browser (or the WebDriver service fronting it) did not start.
    #[error("browser launch failed: {0}")]
    SessionLaunch(String),

    /// The browser session could not be torn down.
    #[error("browser close failed: {0}")]
    SessionClose(String),
}

impl FetchError {
    /// Coarse class of this failure.
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::InvalidUrl { .. }
            | FetchError::NavigationTimeout { .. }
            | FetchError::Navigation { .. }
            | FetchError::NetworkIdleTimeout(_) => FailureKind::Navigation,
            FetchError::LinkNotFound { .. }
            | FetchError::AmbiguousLink { .. }
            | FetchError::Element(_)
            | FetchError::Capture(_) => FailureKind::ElementResolution,
            FetchError::SessionLaunch(_) | FetchError::SessionClose(_) => {
                FailureKind::SessionLifecycle
            }
        }
    }
}

/// Convenient alias for results that use [`FetchError`].
pub type Result<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_names_url_and_bound() {
        let err = FetchError::NavigationTimeout {
            url: "https://example.org/".into(),
            timeout: Duration::from_secs(60),
        };
        assert_eq!(
            err.to_string(),
            "navigation to https://example.org/ timed out after 60s"
        );
        assert_eq!(err.kind(), FailureKind::Navigation);
    }

    #[test]
    fn session_failures_are_lifecycle_kind() {
        assert_eq!(
            FetchError::SessionLaunch("refused".into()).kind(),
            FailureKind::SessionLifecycle
        );
        assert_eq!(
            FetchError::SessionClose("gone".into()).kind(),
            FailureKind::SessionLifecycle
        );
    }

    #[test]
    fn failure_kind_serializes_snake_case() {
        let raw = serde_json::to_string(&FailureKind::ElementResolution).unwrap();
        assert_eq!(raw, "\"element_resolution\"");
    }
}
