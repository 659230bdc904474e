//! # consentric-core
//!
//! Core library for consentric - a consent-gated adapter over a wrapped
//! analytics service.
//!
//! This library provides:
//! - Consent bookkeeping: a category→flags catalog, a ledger of granted
//!   categories and a durable mirror of it
//! - A trait seam for the wrapped analytics service, plus an in-process
//!   reference implementation
//! - A metrics facade with idempotent session handling and tracking
//!   wrappers
//! - Configuration management and logging infrastructure
//!
//! ## Architecture
//!
//! The facade is the only writer. Consent flows one way:
//! - **Catalog:** which flags each category controls (fixed at startup)
//! - **Ledger:** which categories are granted right now
//! - **Persistence:** the ledger's last state, replayed on the next start
//!
//! Tracking calls pass straight through to the wrapped service; what the
//! service does with them (batching, transport, retries) is its own
//! business.
//!
//! ## Example
//!
//! ```rust
//! use consentric_core::{Config, ConsentCategory, MemoryService, MetricsFacade};
//!
//! let config = Config::with_app_key("demo-app");
//! let mut metrics = MetricsFacade::new(config, MemoryService::new(), None)
//!     .expect("failed to construct facade");
//!
//! metrics.update_consent(&[ConsentCategory::Minimal, ConsentCategory::Ux]);
//! metrics.start_session(false, false);
//! metrics.track_event("login", None, None);
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use consent::{ConsentCatalog, ConsentCategory, ConsentLedger, ConsentPersistence};
pub use error::{Error, Result};
pub use metrics::MetricsFacade;
pub use service::{AnalyticsService, AutoTracker, Event, MemoryService, Segments};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};
pub use toggle::ToggleControl;

// Public modules
pub mod config;
pub mod consent;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod service;
pub mod storage;
pub mod toggle;
