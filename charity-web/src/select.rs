use regex::Regex;
use std::sync::OnceLock;

/// Lowercase `s` and collapse every whitespace run to a single space.
fn fold(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Substring match against an element's `title`, ignoring case and how
/// whitespace is laid out.
#[derive(Debug, Clone)]
pub struct TitleMatcher {
    marker: String,
    folded: String,
}

impl TitleMatcher {
    pub fn new(marker: impl Into<String>) -> Self {
        let marker = marker.into();
        let folded = fold(&marker);
        Self { marker, folded }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// ```
    /// use charity_web::TitleMatcher;
    ///
    /// let m = TitleMatcher::new("View Annual Information Statement");
    /// assert!(m.matches("view annual information statement 2021"));
    /// assert!(!m.matches("View Financial Report 2021"));
    /// ```
    pub fn matches(&self, title: &str) -> bool {
        fold(title).contains(&self.folded)
    }
}

fn year_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("[0-9]{4}").ok()).as_ref()
}

/// The leftmost run of four ASCII digits in `title`, as a year.
///
/// Longer digit runs yield their first four digits. Digits from other
/// scripts are not read as years.
pub fn extract_year(title: &str) -> Option<i32> {
    year_pattern()?.find(title)?.as_str().parse().ok()
}

/// One titled element seen during a single retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateDocument {
    pub title_text: String,
    pub extracted_year: Option<i32>,
}

impl CandidateDocument {
    pub fn from_title(title: impl Into<String>) -> Self {
        let title_text = title.into();
        let extracted_year = extract_year(&title_text);
        Self {
            title_text,
            extracted_year,
        }
    }
}

/// Position and year of the candidate with the greatest year.
///
/// Candidates without a year are skipped. The scan only replaces the current
/// pick on a strictly greater year, so the earliest of equal years wins.
pub fn select_latest<'a, I>(candidates: I) -> Option<(usize, i32)>
where
    I: IntoIterator<Item = &'a CandidateDocument>,
{
    let mut best: Option<(usize, i32)> = None;
    for (idx, candidate) in candidates.into_iter().enumerate() {
        let Some(year) = candidate.extracted_year else {
            continue;
        };
        match best {
            Some((_, best_year)) if year <= best_year => {}
            _ => best = Some((idx, year)),
        }
    }
    best
}
