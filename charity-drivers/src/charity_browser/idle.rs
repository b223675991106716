//! Network-idle detection.
//!
//! WebDriver exposes no network events, so idleness is approximated from the
//! page itself: the document must be fully loaded and the number of
//! performance resource entries must stay unchanged for a trailing quiet
//! window.

use serde_json::Value;
use std::time::{Duration, Instant};

/// Script sampled on every poll. Returns `[readyState, resourceCount]`.
pub const ACTIVITY_SCRIPT: &str = r#"
    return [
        document.readyState,
        (window.performance && performance.getEntriesByType)
            ? performance.getEntriesByType('resource').length
            : 0
    ];
"#;

/// Bounds for a single idle wait.
#[derive(Debug, Clone, Copy)]
pub struct IdlePolicy {
    /// Give up after this long.
    pub timeout: Duration,
    /// Resource count must be stable for this long.
    pub quiet: Duration,
    /// Delay between samples.
    pub poll: Duration,
}

impl Default for IdlePolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            quiet: Duration::from_millis(500),
            poll: Duration::from_millis(100),
        }
    }
}

/// One sample of page activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageActivity {
    pub ready_state: String,
    pub resource_count: u64,
}

impl PageActivity {
    /// Decode the value returned by [`ACTIVITY_SCRIPT`].
    pub fn from_script_value(value: &Value) -> Option<Self> {
        let arr = value.as_array()?;
        Some(Self {
            ready_state: arr.first()?.as_str()?.to_string(),
            resource_count: arr.get(1)?.as_u64()?,
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.ready_state == "complete"
    }
}

/// Tracks consecutive samples until the quiet window has elapsed.
#[derive(Debug)]
pub struct IdleTracker {
    quiet: Duration,
    last_count: Option<u64>,
    stable_since: Option<Instant>,
}

impl IdleTracker {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            last_count: None,
            stable_since: None,
        }
    }

    /// Record a sample taken at `now`; returns true once the page is idle.
    pub fn observe(&mut self, sample: &PageActivity, now: Instant) -> bool {
        if !sample.is_loaded() {
            self.last_count = None;
            self.stable_since = None;
            return false;
        }
        match (self.last_count, self.stable_since) {
            (Some(count), Some(since)) if count == sample.resource_count => {
                now.saturating_duration_since(since) >= self.quiet
            }
            _ => {
                self.last_count = Some(sample.resource_count);
                self.stable_since = Some(now);
                self.quiet.is_zero()
            }
        }
    }

    /// Forget history, e.g. after a sample could not be read.
    pub fn reset(&mut self) {
        self.last_count = None;
        self.stable_since = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample(state: &str, count: u64) -> PageActivity {
        PageActivity {
            ready_state: state.to_string(),
            resource_count: count,
        }
    }

    #[test]
    fn decodes_script_result() {
        let got = PageActivity::from_script_value(&json!(["complete", 12])).unwrap();
        assert_eq!(got, sample("complete", 12));
        assert!(PageActivity::from_script_value(&json!({"state": "complete"})).is_none());
        assert!(PageActivity::from_script_value(&json!(["loading"])).is_none());
    }

    #[test]
    fn idle_after_quiet_window() {
        let quiet = Duration::from_millis(500);
        let mut tracker = IdleTracker::new(quiet);
        let t0 = Instant::now();

        assert!(!tracker.observe(&sample("complete", 3), t0));
        assert!(!tracker.observe(&sample("complete", 3), t0 + Duration::from_millis(200)));
        assert!(tracker.observe(&sample("complete", 3), t0 + Duration::from_millis(500)));
    }

    #[test]
    fn new_requests_restart_the_window() {
        let mut tracker = IdleTracker::new(Duration::from_millis(500));
        let t0 = Instant::now();

        tracker.observe(&sample("complete", 3), t0);
        assert!(!tracker.observe(&sample("complete", 5), t0 + Duration::from_millis(400)));
        assert!(!tracker.observe(&sample("complete", 5), t0 + Duration::from_millis(800)));
        assert!(tracker.observe(&sample("complete", 5), t0 + Duration::from_millis(900)));
    }

    #[test]
    fn loading_document_is_never_idle() {
        let mut tracker = IdleTracker::new(Duration::ZERO);
        let t0 = Instant::now();
        assert!(!tracker.observe(&sample("interactive", 0), t0));
        assert!(tracker.observe(&sample("complete", 0), t0));
    }
}
