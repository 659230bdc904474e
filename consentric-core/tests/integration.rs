//! Integration tests for the consent lifecycle
//!
//! These tests run the facade end-to-end over a real SQLite store in a
//! temp directory, covering the restart path: grant consent, tear the
//! facade down, rebuild it over the same store and verify the prior
//! consent is reapplied to a fresh service.

use std::path::PathBuf;

use consentric_core::{
    Config, ConsentCategory, Event, MemoryService, MetricsFacade, SqliteStore,
};
use tempfile::TempDir;

fn open_store(dir: &TempDir) -> SqliteStore {
    let path: PathBuf = dir.path().join("store.db");
    SqliteStore::open(&path).expect("store should open")
}

fn build_facade(dir: &TempDir) -> MetricsFacade<MemoryService> {
    MetricsFacade::new(
        Config::with_app_key("integration-app"),
        MemoryService::new(),
        Some(Box::new(open_store(dir))),
    )
    .expect("facade should construct")
}

// ============================================
// Consent restart flow
// ============================================

#[test]
fn test_consent_survives_restart() {
    let dir = TempDir::new().unwrap();

    {
        let mut metrics = build_facade(&dir);
        assert!(metrics.granted_consents().is_empty());

        metrics.update_consent(&[ConsentCategory::Minimal, ConsentCategory::Performance]);
        assert!(metrics.check_consent("events"));
    }

    // Fresh facade, fresh service, same store
    let metrics = build_facade(&dir);
    assert_eq!(
        metrics.granted_consents(),
        vec![ConsentCategory::Minimal, ConsentCategory::Performance]
    );
    // The replayed grants reached the brand-new service
    assert!(metrics.check_consent("minimal"));
    assert!(metrics.check_consent("events"));
    assert!(!metrics.check_consent("clicks"));
}

#[test]
fn test_revocation_survives_restart() {
    let dir = TempDir::new().unwrap();

    {
        let mut metrics = build_facade(&dir);
        metrics.update_consent(&[ConsentCategory::All]);
    }

    {
        let mut metrics = build_facade(&dir);
        assert_eq!(metrics.granted_consents().len(), 5);
        metrics.update_consent(&[]);
    }

    let metrics = build_facade(&dir);
    assert!(metrics.granted_consents().is_empty());
    assert!(!metrics.check_consent("sessions"));
}

#[test]
fn test_device_id_stable_across_restarts() {
    let dir = TempDir::new().unwrap();

    let first = build_facade(&dir).device_id().to_string();
    let second = build_facade(&dir).device_id().to_string();

    assert_eq!(first, second);
}

// ============================================
// Session and tracking flow
// ============================================

#[test]
fn test_session_and_tracking_round_trip() {
    let dir = TempDir::new().unwrap();
    let mut metrics = build_facade(&dir);

    metrics.update_consent(&[ConsentCategory::Minimal, ConsentCategory::Performance]);

    metrics.start_session(false, false);
    metrics.start_session(false, false);

    metrics.track_view("home", None);
    metrics.track_event("login", None, None);
    metrics.add_event(Event::new("purchase").with_count(2).with_sum(19.98));
    metrics.track_error("handled failure", None, None, None);

    metrics.end_session(false);
    metrics.end_session(false);

    let service = metrics.service();
    assert_eq!(service.begin_session_calls(), 1);
    assert_eq!(service.end_session_calls(), 1);
    assert_eq!(service.completed_sessions().len(), 1);
    assert_eq!(service.views().len(), 1);
    assert_eq!(service.events().len(), 2);
    assert_eq!(service.events()[1].count, 2);
    assert_eq!(service.errors().len(), 1);
    assert!(service.errors()[0].non_fatal);
}

#[test]
fn test_facade_without_store_still_tracks() {
    let mut metrics = MetricsFacade::new(
        Config::with_app_key("integration-app"),
        MemoryService::new(),
        None,
    )
    .expect("facade should construct without a store");

    metrics.update_consent(&[ConsentCategory::Ux]);
    assert_eq!(metrics.granted_consents(), vec![ConsentCategory::Ux]);

    metrics.start_session(true, false);
    metrics.track_event("tap", None, Some(3));

    assert_eq!(metrics.service().events()[0].count, 3);
}
