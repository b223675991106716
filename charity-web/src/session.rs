use crate::select::TitleMatcher;
use async_trait::async_trait;
use charity_common::Result;
use std::time::Duration;
use url::Url;

/// Opens one independent browser session per call.
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    type Session: BrowserSession;

    async fn launch(&self) -> Result<Self::Session>;
}

/// The page operations the document traversal is built from.
///
/// Each method reports failures as the [`FetchError`](charity_common::FetchError)
/// class it belongs to. Implementations must make [`close`](Self::close)
/// release the browser even after earlier calls failed.
#[async_trait]
pub trait BrowserSession: Send {
    type Element: Send + Sync;

    /// Load `url`, bounded by `timeout`.
    async fn goto(&mut self, url: &Url, timeout: Duration) -> Result<()>;

    /// Rendered elements with role `link` and accessible name exactly
    /// `name`, in document order. May wait a bounded time for the first one
    /// to appear.
    async fn find_links(&mut self, name: &str) -> Result<Vec<Self::Element>>;

    /// Elements whose title may match `matcher`, in document order. Callers
    /// re-check each title with [`TitleMatcher::matches`].
    async fn find_titled(&mut self, matcher: &TitleMatcher) -> Result<Vec<Self::Element>>;

    /// The element's `title` attribute, if it has one.
    async fn title_of(&mut self, element: &Self::Element) -> Result<Option<String>>;

    async fn click(&mut self, element: &Self::Element) -> Result<()>;

    async fn wait_for_network_idle(&mut self) -> Result<()>;

    /// Full rendered markup of the current page.
    async fn content(&mut self) -> Result<String>;

    async fn close(self) -> Result<()>;
}
