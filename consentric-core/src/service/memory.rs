//! In-process analytics service
//!
//! A reference [`AnalyticsService`] that keeps everything in memory: the
//! registered groups, the granted flag set, session timing and every
//! delivered event. It backs the demo TUI and gives tests an observable
//! collaborator. There is no transport; delivery means "recorded here".

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use super::{AnalyticsService, AutoTracker, Event, Segments};
use crate::config::Config;
use crate::consent::ConsentCatalog;
use crate::error::Result;

/// An error delivered through [`AnalyticsService::record_error`]
#[derive(Debug, Clone)]
pub struct RecordedError {
    pub message: String,
    pub non_fatal: bool,
    pub segments: Segments,
}

/// Reference service implementation backed by plain collections
#[derive(Debug, Default)]
pub struct MemoryService {
    initialized: bool,
    app_key: String,
    device_id: Option<String>,

    groups: Vec<(String, Vec<String>)>,
    granted: BTreeSet<String>,

    session_started_at: Option<DateTime<Utc>>,
    begin_session_calls: usize,
    end_session_calls: usize,
    completed_sessions: Vec<u64>,

    events: Vec<Event>,
    views: Vec<(String, Segments)>,
    errors: Vec<RecordedError>,
    trackers: BTreeSet<AutoTracker>,
}

impl MemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    fn group_flags(&self, name: &str) -> Option<&[String]> {
        self.groups
            .iter()
            .find(|(group, _)| group == name)
            .map(|(_, flags)| flags.as_slice())
    }

    // ----- observation surface -----

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn app_key(&self) -> &str {
        &self.app_key
    }

    pub fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref()
    }

    /// Granted names (flags and group names), sorted
    pub fn granted(&self) -> Vec<String> {
        self.granted.iter().cloned().collect()
    }

    pub fn session_active(&self) -> bool {
        self.session_started_at.is_some()
    }

    pub fn begin_session_calls(&self) -> usize {
        self.begin_session_calls
    }

    pub fn end_session_calls(&self) -> usize {
        self.end_session_calls
    }

    /// Durations (seconds) of completed sessions
    pub fn completed_sessions(&self) -> &[u64] {
        &self.completed_sessions
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn views(&self) -> &[(String, Segments)] {
        &self.views
    }

    pub fn errors(&self) -> &[RecordedError] {
        &self.errors
    }

    pub fn trackers(&self) -> Vec<AutoTracker> {
        self.trackers.iter().copied().collect()
    }
}

impl AnalyticsService for MemoryService {
    fn init(&mut self, config: &Config) -> Result<()> {
        self.initialized = true;
        self.app_key = config.app_key.clone();
        self.device_id = config.device_id.clone();
        tracing::debug!(app_key = %self.app_key, "memory service initialized");
        Ok(())
    }

    fn group_features(&mut self, catalog: &ConsentCatalog) {
        self.groups = catalog
            .entries()
            .iter()
            .map(|(category, flags)| (category.as_str().to_string(), flags.clone()))
            .collect();
    }

    fn add_consent(&mut self, names: &[&str]) {
        for name in names {
            if let Some(flags) = self.group_flags(name) {
                let members: Vec<String> = flags.to_vec();
                self.granted.insert(name.to_string());
                for flag in members {
                    self.granted.insert(flag);
                }
            } else {
                self.granted.insert(name.to_string());
            }
        }
    }

    fn remove_consent(&mut self, names: &[&str], include_children: bool) {
        for name in names {
            self.granted.remove(*name);
            if include_children {
                if let Some(flags) = self.group_flags(name) {
                    let members: Vec<String> = flags.to_vec();
                    for flag in members {
                        self.granted.remove(&flag);
                    }
                }
            }
        }
    }

    fn check_consent(&self, name: &str) -> bool {
        match self.group_flags(name) {
            Some(flags) => flags.iter().all(|flag| self.granted.contains(flag)),
            None => self.granted.contains(name),
        }
    }

    fn begin_session(&mut self, no_heartbeat: bool, force: bool) {
        self.begin_session_calls += 1;
        if self.session_started_at.is_none() || force {
            self.session_started_at = Some(Utc::now());
        }
        tracing::debug!(no_heartbeat, force, "session began");
    }

    fn end_session(&mut self, duration: Option<u64>, force: bool) {
        self.end_session_calls += 1;
        let elapsed = self.session_started_at.take().map(|started_at| {
            Utc::now()
                .signed_duration_since(started_at)
                .num_seconds()
                .max(0) as u64
        });
        self.completed_sessions
            .push(duration.or(elapsed).unwrap_or(0));
        tracing::debug!(force, "session ended");
    }

    fn add_event(&mut self, event: Event) {
        self.events.push(event);
    }

    fn track_pageview(&mut self, name: &str, segments: &Segments) {
        self.views.push((name.to_string(), segments.clone()));
    }

    fn record_error(&mut self, error: &str, non_fatal: bool, segments: &Segments) {
        self.errors.push(RecordedError {
            message: error.to_string(),
            non_fatal,
            segments: segments.clone(),
        });
    }

    fn enable_tracker(&mut self, tracker: AutoTracker) {
        self.trackers.insert(tracker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consent::ConsentCategory;

    fn service_with_default_catalog() -> MemoryService {
        let mut service = MemoryService::new();
        service.group_features(&ConsentCatalog::default());
        service
    }

    #[test]
    fn test_group_consent_expands_to_flags() {
        let mut service = service_with_default_catalog();
        service.add_consent(&["minimal"]);

        assert!(service.check_consent("sessions"));
        assert!(service.check_consent("views"));
        assert!(service.check_consent("minimal"));
        assert!(!service.check_consent("clicks"));
    }

    #[test]
    fn test_remove_with_children_revokes_members() {
        let mut service = service_with_default_catalog();
        service.add_consent(&["ux"]);
        assert!(service.check_consent("clicks"));

        service.remove_consent(&["ux"], true);
        assert!(!service.check_consent("clicks"));
        assert!(!service.check_consent("ux"));
    }

    #[test]
    fn test_remove_without_children_keeps_members() {
        let mut service = service_with_default_catalog();
        service.add_consent(&["ux"]);

        service.remove_consent(&["ux"], false);
        // The group name is revoked but flags it implied stay granted
        assert!(service.granted().contains(&"clicks".to_string()));
    }

    #[test]
    fn test_group_check_follows_member_flags() {
        let mut service = service_with_default_catalog();
        service.add_consent(&["minimal"]);
        assert!(service.check_consent("minimal"));

        service.remove_consent(&["views"], false);
        assert!(!service.check_consent("minimal"));
    }

    #[test]
    fn test_raw_flag_consent() {
        let mut service = service_with_default_catalog();
        service.add_consent(&["attribution"]);
        assert!(service.check_consent("attribution"));

        service.remove_consent(&["attribution"], true);
        assert!(!service.check_consent("attribution"));
    }

    #[test]
    fn test_session_duration_computed_when_absent() {
        let mut service = MemoryService::new();
        service.begin_session(false, false);
        assert!(service.session_active());

        service.end_session(None, false);
        assert!(!service.session_active());
        assert_eq!(service.completed_sessions().len(), 1);
    }

    #[test]
    fn test_explicit_session_duration_wins() {
        let mut service = MemoryService::new();
        service.begin_session(false, false);
        service.end_session(Some(42), false);
        assert_eq!(service.completed_sessions(), &[42]);
    }
}
