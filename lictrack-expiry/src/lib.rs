//! Expiration classification and alerting for tracked licences.
//!
//! Everything in this crate is pure: callers pass the current instant (or a
//! [`Classifier`] holding a clock) and get back a value. No I/O.
//!
//! # Day arithmetic
//!
//! A licence's expiration date is taken as midnight UTC of that day. The
//! day delta is `ceil((expiration - now) / 1 day)`, so a licence expiring
//! today has a delta of 0 and is *not* expired; it becomes expired once the
//! calendar date has passed.
//!
//! # Bands
//!
//! The default [`BandConfig::SingleThreshold`] splits non-expired licences
//! into `warning` (within 30 days) and `active`. The alternative
//! [`BandConfig::ThreeBand`] uses `danger` (≤ 7), `warn` (≤ 15) and
//! `safe` (≤ 30).

mod alerts;
mod bands;
mod classify;
mod error;
mod filter;
mod stats;

pub use alerts::{build_alert_list, Alert};
pub use bands::{BandConfig, Tier, DEFAULT_WARNING_DAYS};
pub use classify::{classify, classify_str, days_until, Classification, Classifier};
pub use error::{ExpiryError, ExpiryResult};
pub use filter::LicenceFilter;
pub use stats::{ExpirationBreakdown, InventoryStats};
