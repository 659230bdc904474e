//! The metrics facade
//!
//! [`MetricsFacade`] is the host application's single handle on analytics.
//! It owns the consent catalog, the ledger of granted categories and the
//! durable mirror of that ledger, and it forwards tracking calls to the
//! wrapped [`AnalyticsService`]. It is an explicitly constructed value the
//! application passes around; there is no global instance.
//!
//! Construction order matters and is fixed: validate the config, resolve a
//! device identity, hand the config to the service, register the consent
//! groups, replay the last-applied consent from storage (without writing it
//! straight back), then wire up automatic trackers if asked.

use uuid::Uuid;

use crate::config::Config;
use crate::consent::{ConsentCatalog, ConsentCategory, ConsentLedger, ConsentPersistence};
use crate::error::Result;
use crate::service::{AnalyticsService, AutoTracker, Event, Segments};
use crate::storage::KeyValueStore;

/// Consent-gated adapter over a wrapped analytics service
pub struct MetricsFacade<S: AnalyticsService> {
    service: S,
    config: Config,
    catalog: ConsentCatalog,
    ledger: ConsentLedger,
    persistence: ConsentPersistence,
    device_id: String,
    session_active: bool,
    initialized: bool,
}

impl<S: AnalyticsService> MetricsFacade<S> {
    /// Construct a facade over the stock consent catalog
    pub fn new(
        config: Config,
        service: S,
        store: Option<Box<dyn KeyValueStore>>,
    ) -> Result<Self> {
        Self::with_catalog(config, ConsentCatalog::default(), service, store)
    }

    /// Construct a facade over a custom consent catalog
    pub fn with_catalog(
        mut config: Config,
        catalog: ConsentCatalog,
        mut service: S,
        store: Option<Box<dyn KeyValueStore>>,
    ) -> Result<Self> {
        config.validate()?;

        let mut persistence = ConsentPersistence::new(store);

        // Resolve a stable device identity before the service sees the
        // config: explicit config value, then the persisted one, then a
        // fresh UUID written back for next time.
        let device_id = match config.device_id.clone() {
            Some(id) => id,
            None => match persistence.load_device_id() {
                Some(id) => id,
                None => {
                    let id = Uuid::new_v4().to_string();
                    tracing::info!(device_id = %id, "generated new device id");
                    persistence.save_device_id(&id);
                    id
                }
            },
        };
        config.device_id = Some(device_id.clone());

        service.init(&config)?;
        service.group_features(&catalog);

        let auto_track = config.auto_track;

        let mut facade = Self {
            service,
            config,
            catalog,
            ledger: ConsentLedger::new(),
            persistence,
            device_id,
            session_active: false,
            initialized: false,
        };

        // Replay the last-applied consent. `initialized` is still false, so
        // the grants below do not echo straight back into storage.
        let prior = facade.persistence.load_consents();
        if !prior.is_empty() {
            tracing::info!(categories = ?prior, "restoring persisted consent");
            facade.add_consent(prior);
        }

        if auto_track {
            for tracker in AutoTracker::ALL {
                facade.service.enable_tracker(tracker);
            }
        }

        facade.initialized = true;
        Ok(facade)
    }

    // ============================================
    // Consent
    // ============================================

    /// Grant one or more consent categories.
    ///
    /// `all` expands to every concrete category in the catalog before
    /// anything is recorded. Categories outside the catalog are handed to
    /// the service by name and not book-kept here.
    pub fn add_consent<I>(&mut self, categories: I)
    where
        I: IntoIterator<Item = ConsentCategory>,
    {
        let mut changed = false;
        for category in categories {
            if category.is_all() {
                let members: Vec<ConsentCategory> = self.catalog.concrete_categories().collect();
                for member in members {
                    changed |= self.grant_one(member);
                }
            } else {
                changed |= self.grant_one(category);
            }
        }
        if changed {
            self.persist();
        }
    }

    /// Revoke one or more consent categories.
    ///
    /// The service is always told to drop descendants too, so flags it
    /// granted on its own as inferred consent go away with the category.
    pub fn remove_consent<I>(&mut self, categories: I)
    where
        I: IntoIterator<Item = ConsentCategory>,
    {
        let mut changed = false;
        for category in categories {
            if category.is_all() {
                let members: Vec<ConsentCategory> = self.catalog.concrete_categories().collect();
                for member in members {
                    changed |= self.revoke_one(member);
                }
            } else {
                changed |= self.revoke_one(category);
            }
        }
        if changed {
            self.persist();
        }
    }

    /// Replace the granted set with `selected`.
    ///
    /// Every concrete catalog category is reconciled in catalog order:
    /// granted when present in `selected`, revoked otherwise. Categories
    /// omitted from the input are actively revoked, so an empty `selected`
    /// revokes everything, `minimal` included. An `all` element selects
    /// every category.
    pub fn update_consent(&mut self, selected: &[ConsentCategory]) {
        let select_all = selected.iter().any(|category| category.is_all());
        let categories: Vec<ConsentCategory> = self.catalog.concrete_categories().collect();

        for category in categories {
            if select_all || selected.contains(&category) {
                self.add_consent([category]);
            } else {
                self.remove_consent([category]);
            }
        }
    }

    /// Whether the named category or raw flag is currently consented.
    ///
    /// A known catalog category is granted only if every one of its member
    /// flags is individually granted per the service. Any other name is
    /// delegated to the service untouched.
    pub fn check_consent(&self, name_or_flag: &str) -> bool {
        if let Ok(category) = name_or_flag.parse::<ConsentCategory>() {
            if let Some(flags) = self.catalog.flags(category) {
                return flags.iter().all(|flag| self.service.check_consent(flag));
            }
        }
        self.service.check_consent(name_or_flag)
    }

    /// Granted categories in catalog order
    pub fn granted_consents(&self) -> Vec<ConsentCategory> {
        self.ledger.snapshot(&self.catalog)
    }

    /// Whether the category is recorded as granted in the ledger
    pub fn is_granted(&self, category: ConsentCategory) -> bool {
        self.ledger.contains(category)
    }

    fn grant_one(&mut self, category: ConsentCategory) -> bool {
        if !self.catalog.contains(category) {
            self.service.add_consent(&[category.as_str()]);
            return false;
        }
        let inserted = self.ledger.insert(category);
        self.service.add_consent(&[category.as_str()]);
        inserted
    }

    fn revoke_one(&mut self, category: ConsentCategory) -> bool {
        if !self.catalog.contains(category) {
            self.service.remove_consent(&[category.as_str()], true);
            return false;
        }
        let removed = self.ledger.remove(category);
        self.service.remove_consent(&[category.as_str()], true);
        removed
    }

    /// Mirror the ledger to storage once initialization has completed
    fn persist(&mut self) {
        if !self.initialized {
            return;
        }
        let snapshot = self.ledger.snapshot(&self.catalog);
        self.persistence.save_consents(&snapshot);
    }

    // ============================================
    // Sessions
    // ============================================

    /// Begin a session. A second call while one is active is a silent
    /// no-op, preserving the service's session-duration accounting.
    pub fn start_session(&mut self, no_heartbeat: bool, force: bool) {
        if self.session_active {
            tracing::debug!("session already active, ignoring start");
            return;
        }
        self.session_active = true;
        self.service.begin_session(no_heartbeat, force);
    }

    /// End the session if one is active; otherwise a silent no-op. No
    /// explicit duration is passed; the service computes it from elapsed
    /// time.
    pub fn end_session(&mut self, force: bool) {
        if !self.session_active {
            tracing::debug!("no active session, ignoring end");
            return;
        }
        self.session_active = false;
        self.service.end_session(None, force);
    }

    pub fn session_active(&self) -> bool {
        self.session_active
    }

    // ============================================
    // Tracking
    // ============================================

    /// Queue a custom event. Count defaults to 1, segments to empty.
    pub fn track_event(&mut self, key: &str, segments: Option<Segments>, count: Option<u32>) {
        let mut event = Event::new(key);
        event.count = count.unwrap_or(1);
        if let Some(segments) = segments {
            event.segmentation = segments;
        }
        self.service.add_event(event);
    }

    /// Queue a fully-shaped event as-is
    pub fn add_event(&mut self, event: Event) {
        self.service.add_event(event);
    }

    /// Record a page/screen view
    pub fn track_view(&mut self, name: &str, segments: Option<Segments>) {
        self.service.track_pageview(name, &segments.unwrap_or_default());
    }

    /// Record an error. `non_fatal` defaults to true. An entry of the
    /// ignore list matching anywhere in the error text drops it before it
    /// reaches the service.
    pub fn track_error(
        &mut self,
        error: &str,
        non_fatal: Option<bool>,
        segments: Option<Segments>,
        ignore_list: Option<&[String]>,
    ) {
        if let Some(ignore_list) = ignore_list {
            if ignore_list.iter().any(|pattern| error.contains(pattern.as_str())) {
                tracing::debug!(%error, "error matches ignore list, dropping");
                return;
            }
        }
        self.service
            .record_error(error, non_fatal.unwrap_or(true), &segments.unwrap_or_default());
    }

    // ============================================
    // Accessors
    // ============================================

    /// The wrapped service, for host-level escape hatches
    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut S {
        &mut self.service
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &ConsentCatalog {
        &self.catalog
    }

    /// The resolved device identity
    pub fn device_id(&self) -> &str {
        &self.device_id
    }
}
