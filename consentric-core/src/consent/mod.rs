//! Consent bookkeeping
//!
//! Three pieces cooperate here:
//! - [`ConsentCatalog`]: the fixed category→flags table, with `all`
//!   synthesized as the union of the rest
//! - [`ConsentLedger`]: the in-memory set of currently granted categories
//! - [`ConsentPersistence`]: the durable mirror of the ledger, written
//!   through an optional key-value collaborator
//!
//! The [`crate::MetricsFacade`] orchestrates all three and talks to the
//! wrapped analytics service; nothing in this module calls the service.

mod catalog;
mod ledger;
mod persistence;

pub use catalog::{ConsentCatalog, ConsentCategory};
pub use ledger::ConsentLedger;
pub use persistence::{ConsentPersistence, CONSENT_KEY, DEVICE_ID_KEY};
