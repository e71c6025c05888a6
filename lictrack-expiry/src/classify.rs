//! Expiration date → tier classification.

use crate::alerts::{build_alert_list, Alert};
use crate::bands::{BandConfig, Tier};
use crate::stats::InventoryStats;
use chrono::{DateTime, NaiveDate, Utc};
use lictrack_types::{midnight_utc, Clock, Licence, SystemClock};
use serde::{Deserialize, Serialize};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// The derived expiration status of one licence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub tier: Tier,
    /// Days since expiration for `Expired`, days until expiration
    /// otherwise, `0` for `Unknown`.
    pub days_delta: i64,
    pub message: String,
}

impl Classification {
    fn unknown(message: &str) -> Self {
        Self {
            tier: Tier::Unknown,
            days_delta: 0,
            message: message.to_string(),
        }
    }
}

/// Whole days from `now` until midnight UTC of `expiration`, rounded up.
///
/// Partial days round toward the later day, so an expiration later today
/// yields `0` and yesterday's yields `-1`.
#[must_use]
pub fn days_until(expiration: NaiveDate, now: DateTime<Utc>) -> i64 {
    let millis = (midnight_utc(expiration) - now).num_milliseconds();
    let quotient = millis / MILLIS_PER_DAY;
    if millis % MILLIS_PER_DAY > 0 {
        quotient + 1
    } else {
        quotient
    }
}

/// Classifies an expiration date relative to `now`.
#[must_use]
pub fn classify(expiration: Option<NaiveDate>, now: DateTime<Utc>, bands: &BandConfig) -> Classification {
    let Some(expiration) = expiration else {
        return Classification::unknown("No expiration date");
    };

    let days = days_until(expiration, now);
    if days < 0 {
        let since = -days;
        return Classification {
            tier: Tier::Expired,
            days_delta: since,
            message: format!("Expired {since} day(s) ago"),
        };
    }

    let message = if days == 0 {
        "Expires today".to_string()
    } else {
        format!("Expires in {days} day(s)")
    };
    Classification {
        tier: bands.tier_for(days),
        days_delta: days,
        message,
    }
}

/// Classifies a raw expiration string.
///
/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (its calendar date is
/// used). Missing, blank or malformed input yields `Unknown`.
#[must_use]
pub fn classify_str(raw: Option<&str>, now: DateTime<Utc>, bands: &BandConfig) -> Classification {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Classification::unknown("No expiration date");
    };

    let parsed = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()));

    match parsed {
        Some(date) => classify(Some(date), now, bands),
        None => Classification::unknown("Unrecognized expiration date"),
    }
}

/// A band policy bound to a clock.
#[derive(Debug, Clone)]
pub struct Classifier<C: Clock = SystemClock> {
    clock: C,
    bands: BandConfig,
}

impl Classifier<SystemClock> {
    /// Default bands, system clock.
    #[must_use]
    pub fn system() -> Self {
        Self::new(SystemClock, BandConfig::default())
    }
}

impl<C: Clock> Classifier<C> {
    pub fn new(clock: C, bands: BandConfig) -> Self {
        Self { clock, bands }
    }

    #[must_use]
    pub fn bands(&self) -> &BandConfig {
        &self.bands
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    #[must_use]
    pub fn classify(&self, expiration: Option<NaiveDate>) -> Classification {
        classify(expiration, self.clock.now(), &self.bands)
    }

    #[must_use]
    pub fn classify_licence(&self, licence: &Licence) -> Classification {
        self.classify(licence.expiration_date)
    }

    #[must_use]
    pub fn alerts<'a>(&self, licences: &'a [Licence]) -> Vec<Alert<'a>> {
        build_alert_list(licences, self.clock.now(), &self.bands)
    }

    #[must_use]
    pub fn stats(&self, licences: &[Licence]) -> InventoryStats {
        InventoryStats::compute(licences, self.clock.now(), &self.bands)
    }
}
