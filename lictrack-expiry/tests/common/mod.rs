//! Shared test helpers for expiry tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use lictrack_types::{Licence, LicenceDraft, LicenceType, RecordId};

/// 2024-06-15 10:30 UTC; mid-day so ceiling behavior is exercised.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap()
}

pub fn today() -> NaiveDate {
    now().date_naive()
}

/// The calendar date `days` away from [`today`].
pub fn day_offset(days: i64) -> NaiveDate {
    today() + Duration::days(days)
}

/// Builds a licence expiring `days` from today (`None` for no date).
pub fn licence(name: &str, expires_in: Option<i64>) -> Licence {
    let draft = LicenceDraft {
        expiration_date: expires_in.map(day_offset),
        ..LicenceDraft::new(name, "Vendor", "1.0")
    };
    Licence::from_draft(RecordId::new(format!("id-{name}")), &draft, now())
}

pub fn licence_full(
    name: &str,
    vendor: &str,
    licence_type: LicenceType,
    cost: f64,
    expires_in: Option<i64>,
) -> Licence {
    let draft = LicenceDraft {
        vendor: vendor.to_string(),
        licence_type,
        initial_cost: cost,
        expiration_date: expires_in.map(day_offset),
        ..LicenceDraft::new(name, vendor, "1.0")
    };
    Licence::from_draft(RecordId::new(format!("id-{name}")), &draft, now())
}
