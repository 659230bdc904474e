//! Durable mirror of the consent ledger
//!
//! Wraps an optional key-value collaborator and owns the fixed keys under
//! which the granted category list and the device id live. The backing
//! store may be absent entirely; every operation then degrades to a no-op
//! read or write.

use std::str::FromStr;

use super::catalog::ConsentCategory;
use crate::storage::KeyValueStore;

/// Storage key for the granted category list (JSON array of names)
pub const CONSENT_KEY: &str = "consent.categories";

/// Storage key for the persisted device id
pub const DEVICE_ID_KEY: &str = "device.id";

/// Adapter between the ledger and the key-value collaborator
pub struct ConsentPersistence {
    store: Option<Box<dyn KeyValueStore>>,
}

impl ConsentPersistence {
    pub fn new(store: Option<Box<dyn KeyValueStore>>) -> Self {
        Self { store }
    }

    /// Whether a backing store is present
    pub fn is_present(&self) -> bool {
        self.store.is_some()
    }

    /// Read the last-applied category list.
    ///
    /// Returns the empty list when no store is present, nothing was stored,
    /// or the payload does not decode. Unknown category names and `all` are
    /// skipped with a warning rather than failing the load.
    pub fn load_consents(&self) -> Vec<ConsentCategory> {
        let Some(store) = &self.store else {
            return Vec::new();
        };
        let Some(raw) = store.get(CONSENT_KEY) else {
            return Vec::new();
        };

        let names: Vec<String> = match serde_json::from_str(&raw) {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!(error = %e, "stored consent list is not valid JSON, ignoring");
                return Vec::new();
            }
        };

        names
            .iter()
            .filter_map(|name| match ConsentCategory::from_str(name) {
                Ok(category) if !category.is_all() => Some(category),
                Ok(_) => {
                    tracing::warn!("stored consent list contains 'all', skipping");
                    None
                }
                Err(_) => {
                    tracing::warn!(name = %name, "stored consent list names unknown category, skipping");
                    None
                }
            })
            .collect()
    }

    /// Overwrite the stored category list with the given one.
    ///
    /// Silent no-op when no store is present.
    pub fn save_consents(&mut self, categories: &[ConsentCategory]) {
        let Some(store) = &mut self.store else {
            return;
        };

        let names: Vec<&str> = categories.iter().map(|c| c.as_str()).collect();
        match serde_json::to_string(&names) {
            Ok(encoded) => {
                tracing::debug!(consents = %encoded, "persisting consent list");
                store.set(CONSENT_KEY, &encoded);
            }
            Err(e) => tracing::warn!(error = %e, "failed to encode consent list"),
        }
    }

    /// Read the persisted device id, if any
    pub fn load_device_id(&self) -> Option<String> {
        self.store.as_ref()?.get(DEVICE_ID_KEY)
    }

    /// Persist the device id. Silent no-op when no store is present.
    pub fn save_device_id(&mut self, device_id: &str) {
        if let Some(store) = &mut self.store {
            store.set(DEVICE_ID_KEY, device_id);
        }
    }
}

impl std::fmt::Debug for ConsentPersistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsentPersistence")
            .field("store", &self.store.as_ref().map(|_| "present"))
            .finish()
    }
}
