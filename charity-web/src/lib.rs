//! Annual Information Statement retrieval.
//!
//! - Session traits and the Fantoccini-backed implementation (`session`, `browser`)
//! - Candidate parsing and latest-year selection (`select`)
//! - The [`DocumentFetcher`] that walks a registry profile page (`fetcher`)
//!
//! The fetcher never returns an error: every failure is folded into a
//! [`RetrievalOutcome`], and [`RetrievalResult`] renders that outcome as the
//! `(content, year)` pair older callers expect.

pub mod browser;
pub mod fetcher;
pub mod select;
pub mod session;

pub use fetcher::{DocumentFetcher, FetchPlan, RetrievalOutcome, RetrievalResult};
pub use select::{CandidateDocument, TitleMatcher};
pub use session::{BrowserSession, SessionLauncher};
