use crate::select::{CandidateDocument, TitleMatcher, select_latest};
use crate::session::{BrowserSession, SessionLauncher};
use charity_common::{FailureKind, FetchError};
use serde::Serialize;
use std::time::Duration;
use tracing::{Instrument, info, info_span, warn};
use url::Url;

/// Content reported when no titled element carries a year.
pub const NO_DOCUMENT_MESSAGE: &str = "Error: No AIS found";
/// Prefix of every content string that is not page markup.
pub const ERROR_PREFIX: &str = "Error: ";

/// Where to click and what to look for on a registry profile page.
#[derive(Debug, Clone)]
pub struct FetchPlan {
    /// Accessible name of the link leading to the documents tab.
    pub link_name: String,
    pub titles: TitleMatcher,
    pub navigation_timeout: Duration,
}

impl Default for FetchPlan {
    fn default() -> Self {
        Self {
            link_name: "Financials & Documents".to_string(),
            titles: TitleMatcher::new("View Annual Information Statement"),
            navigation_timeout: Duration::from_secs(60),
        }
    }
}

/// What a single retrieval produced.
#[derive(Debug)]
pub enum RetrievalOutcome {
    /// The latest statement was opened and its page captured.
    Found {
        content: String,
        year: i32,
        /// blake3 hex digest of `content`.
        checksum: String,
    },
    /// The documents tab listed no statement with a year.
    NotFound,
    Failed(FetchError),
}

impl RetrievalOutcome {
    fn found(content: String, year: i32) -> Self {
        let checksum = blake3::hash(content.as_bytes()).to_hex().to_string();
        Self::Found {
            content,
            year,
            checksum,
        }
    }

    pub fn year(&self) -> Option<i32> {
        match self {
            Self::Found { year, .. } => Some(*year),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    /// Short stable label: `found`, `not_found` or `failed`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Found { .. } => "found",
            Self::NotFound => "not_found",
            Self::Failed(_) => "failed",
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Failed(err) => Some(err.kind()),
            _ => None,
        }
    }

    pub fn checksum(&self) -> Option<&str> {
        match self {
            Self::Found { checksum, .. } => Some(checksum),
            _ => None,
        }
    }

    /// Render as the `(content, year)` pair.
    pub fn to_result(&self) -> RetrievalResult {
        match self {
            Self::Found { content, year, .. } => RetrievalResult {
                content: content.clone(),
                year: Some(*year),
            },
            Self::NotFound => RetrievalResult {
                content: NO_DOCUMENT_MESSAGE.to_string(),
                year: None,
            },
            Self::Failed(err) => RetrievalResult {
                content: format!("{ERROR_PREFIX}{err}"),
                year: None,
            },
        }
    }
}

impl From<RetrievalOutcome> for RetrievalResult {
    fn from(outcome: RetrievalOutcome) -> Self {
        match outcome {
            RetrievalOutcome::Found { content, year, .. } => RetrievalResult {
                content,
                year: Some(year),
            },
            other => other.to_result(),
        }
    }
}

/// Page markup (or an `"Error: …"` message) and the statement year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetrievalResult {
    pub content: String,
    pub year: Option<i32>,
}

impl RetrievalResult {
    /// True when `content` is a diagnostic rather than markup.
    pub fn is_error(&self) -> bool {
        self.year.is_none() && self.content.starts_with(ERROR_PREFIX)
    }
}

/// Finds and opens the most recent Annual Information Statement.
///
/// Every call opens its own browser session through the launcher and closes
/// it before returning, so concurrent calls never share a browser.
pub struct DocumentFetcher<L> {
    launcher: L,
    plan: FetchPlan,
}

impl<L: SessionLauncher> DocumentFetcher<L> {
    pub fn new(launcher: L, plan: FetchPlan) -> Self {
        Self { launcher, plan }
    }

    pub fn plan(&self) -> &FetchPlan {
        &self.plan
    }

    /// Retrieve the statement page at `url` as a `(content, year)` pair.
    pub async fn fetch(&self, url: &str) -> RetrievalResult {
        self.fetch_outcome(url).await.into()
    }

    /// Retrieve the statement page at `url`. Never fails; failures are
    /// reported as [`RetrievalOutcome::Failed`].
    pub async fn fetch_outcome(&self, url: &str) -> RetrievalOutcome {
        let span = info_span!("fetch", %url);
        async move {
            let target = match Url::parse(url) {
                Ok(target) => target,
                Err(e) => {
                    return self.report(RetrievalOutcome::Failed(FetchError::InvalidUrl {
                        url: url.to_string(),
                        reason: e.to_string(),
                    }));
                }
            };

            let mut session = match self.launcher.launch().await {
                Ok(session) => session,
                Err(err) => return self.report(RetrievalOutcome::Failed(err)),
            };

            let walked = self.walk(&mut session, &target).await;
            let closed = session.close().await;

            let outcome = match (walked, closed) {
                (Ok(Some((content, year))), Ok(())) => RetrievalOutcome::found(content, year),
                (Ok(None), Ok(())) => RetrievalOutcome::NotFound,
                (Ok(_), Err(close_err)) => RetrievalOutcome::Failed(close_err),
                (Err(err), Ok(())) => RetrievalOutcome::Failed(err),
                (Err(err), Err(close_err)) => {
                    warn!(target: "fetch", error = %close_err, "session close failed after an earlier failure");
                    RetrievalOutcome::Failed(err)
                }
            };
            self.report(outcome)
        }
        .instrument(span)
        .await
    }

    /// The linear traversal. `Ok(None)` means no statement carried a year.
    async fn walk<S: BrowserSession>(
        &self,
        session: &mut S,
        target: &Url,
    ) -> charity_common::Result<Option<(String, i32)>> {
        session.goto(target, self.plan.navigation_timeout).await?;

        let mut links = session.find_links(&self.plan.link_name).await?;
        let link = match links.len() {
            0 => {
                return Err(FetchError::LinkNotFound {
                    name: self.plan.link_name.clone(),
                });
            }
            1 => links.remove(0),
            count => {
                return Err(FetchError::AmbiguousLink {
                    name: self.plan.link_name.clone(),
                    count,
                });
            }
        };
        session.click(&link).await?;
        session.wait_for_network_idle().await?;

        let elements = session.find_titled(&self.plan.titles).await?;
        let mut matched = Vec::with_capacity(elements.len());
        for element in &elements {
            let Some(title) = session.title_of(element).await? else {
                continue;
            };
            if self.plan.titles.matches(&title) {
                matched.push((element, CandidateDocument::from_title(title)));
            }
        }
        tracing::debug!(
            target: "fetch",
            titled = elements.len(),
            matched = matched.len(),
            years = ?matched.iter().map(|(_, c)| c.extracted_year).collect::<Vec<_>>(),
            "statement candidates"
        );

        let Some((idx, year)) = select_latest(matched.iter().map(|(_, c)| c)) else {
            return Ok(None);
        };
        let (element, candidate) = &matched[idx];
        info!(target: "fetch", year, title = %candidate.title_text, "opening latest statement");

        session.click(element).await?;
        session.wait_for_network_idle().await?;
        let content = session.content().await?;
        Ok(Some((content, year)))
    }

    fn report(&self, outcome: RetrievalOutcome) -> RetrievalOutcome {
        match &outcome {
            RetrievalOutcome::Found { year, checksum, content } => info!(
                target: "fetch",
                year,
                html_checksum = %checksum,
                bytes = content.len(),
                "statement captured"
            ),
            RetrievalOutcome::NotFound => info!(target: "fetch", "no statement with a year found"),
            RetrievalOutcome::Failed(err) => warn!(
                target: "fetch",
                kind = ?err.kind(),
                error = %err,
                "retrieval failed"
            ),
        }
        outcome
    }
}
