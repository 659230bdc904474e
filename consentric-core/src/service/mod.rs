//! The wrapped analytics service seam
//!
//! Everything heavyweight (batching, transport, retries, session timing)
//! lives behind [`AnalyticsService`]. This layer only decides *what* to
//! tell the service and *when*; it never inspects how the service delivers
//! it.

mod memory;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::consent::ConsentCatalog;
use crate::error::Result;

pub use memory::{MemoryService, RecordedError};

/// Event segmentation: string key/value pairs attached to a tracked item
pub type Segments = BTreeMap<String, String>;

// ============================================
// Events
// ============================================

/// A custom event handed to the service's queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Event key
    pub key: String,

    /// Occurrence count
    #[serde(default = "default_count")]
    pub count: u32,

    /// Value summed across occurrences (e.g. a price)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sum: Option<f64>,

    /// Duration in seconds, if the event measures one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dur: Option<f64>,

    /// Segmentation key/value pairs
    #[serde(default)]
    pub segmentation: Segments,
}

fn default_count() -> u32 {
    1
}

impl Event {
    /// An event with the given key, count 1 and no segmentation
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            count: default_count(),
            sum: None,
            dur: None,
            segmentation: Segments::new(),
        }
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn with_sum(mut self, sum: f64) -> Self {
        self.sum = Some(sum);
        self
    }

    pub fn with_segment(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.segmentation.insert(key.into(), value.into());
        self
    }
}

// ============================================
// Automatic trackers
// ============================================

/// The service's built-in trackers that `auto_track` wires up
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoTracker {
    Sessions,
    Clicks,
    Forms,
    Links,
    Scrolls,
    Views,
    Errors,
}

impl AutoTracker {
    /// Every tracker, in wiring order
    pub const ALL: [AutoTracker; 7] = [
        AutoTracker::Sessions,
        AutoTracker::Clicks,
        AutoTracker::Forms,
        AutoTracker::Links,
        AutoTracker::Scrolls,
        AutoTracker::Views,
        AutoTracker::Errors,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AutoTracker::Sessions => "sessions",
            AutoTracker::Clicks => "clicks",
            AutoTracker::Forms => "forms",
            AutoTracker::Links => "links",
            AutoTracker::Scrolls => "scrolls",
            AutoTracker::Views => "views",
            AutoTracker::Errors => "errors",
        }
    }
}

impl std::fmt::Display for AutoTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================
// Service trait
// ============================================

/// The wrapped analytics service.
///
/// Implementations own delivery entirely. Apart from `init`, methods do not
/// fail: a service that cannot deliver drops or queues on its own terms,
/// per its own policy. Consent names passed to `add_consent` /
/// `remove_consent` / `check_consent` may be group names the service
/// learned from [`AnalyticsService::group_features`] or raw feature flags;
/// behavior for names it has never seen is the service's business.
pub trait AnalyticsService {
    /// Configure the service. Called exactly once, before anything else.
    fn init(&mut self, config: &Config) -> Result<()>;

    /// Register the category→flags grouping, including the `all` group
    fn group_features(&mut self, catalog: &ConsentCatalog);

    /// Grant consent for the named groups or flags
    fn add_consent(&mut self, names: &[&str]);

    /// Revoke consent for the named groups or flags.
    ///
    /// With `include_children` the service must also revoke anything it
    /// granted on its own as inferred consent under those names.
    fn remove_consent(&mut self, names: &[&str], include_children: bool);

    /// Whether the named group or flag is currently consented
    fn check_consent(&self, name: &str) -> bool;

    /// Begin a session
    fn begin_session(&mut self, no_heartbeat: bool, force: bool);

    /// End the current session. Without an explicit duration the service
    /// computes one from elapsed time.
    fn end_session(&mut self, duration: Option<u64>, force: bool);

    /// Queue a custom event
    fn add_event(&mut self, event: Event);

    /// Record a page/screen view
    fn track_pageview(&mut self, name: &str, segments: &Segments);

    /// Record an error
    fn record_error(&mut self, error: &str, non_fatal: bool, segments: &Segments);

    /// Wire up one of the service's built-in trackers
    fn enable_tracker(&mut self, tracker: AutoTracker);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_defaults() {
        let event = Event::new("purchase");
        assert_eq!(event.key, "purchase");
        assert_eq!(event.count, 1);
        assert!(event.sum.is_none());
        assert!(event.segmentation.is_empty());
    }

    #[test]
    fn test_event_builders() {
        let event = Event::new("purchase")
            .with_count(3)
            .with_sum(9.99)
            .with_segment("currency", "EUR");

        assert_eq!(event.count, 3);
        assert_eq!(event.sum, Some(9.99));
        assert_eq!(event.segmentation.get("currency").map(String::as_str), Some("EUR"));
    }

    #[test]
    fn test_event_deserialize_fills_defaults() {
        let event: Event = serde_json::from_str(r#"{"key": "login"}"#).unwrap();
        assert_eq!(event.count, 1);
        assert!(event.segmentation.is_empty());
    }

    #[test]
    fn test_tracker_names() {
        assert_eq!(AutoTracker::Sessions.as_str(), "sessions");
        assert_eq!(AutoTracker::ALL.len(), 7);
    }
}
