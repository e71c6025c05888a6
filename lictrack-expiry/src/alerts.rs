//! Ordered alert lists.

use crate::bands::{BandConfig, Tier};
use crate::classify::classify;
use chrono::{DateTime, Utc};
use lictrack_types::Licence;

/// A licence that needs attention, with its classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert<'a> {
    pub licence: &'a Licence,
    pub tier: Tier,
    pub days_delta: i64,
    pub message: String,
}

/// Classifies every licence and returns the ones in an alerting tier.
///
/// Order: tier priority (expired first), then ascending `days_delta`, then
/// software name. Identical input and `now` always give identical output.
#[must_use]
pub fn build_alert_list<'a>(licences: &'a [Licence], now: DateTime<Utc>, bands: &BandConfig) -> Vec<Alert<'a>> {
    let mut alerts: Vec<Alert<'a>> = licences
        .iter()
        .filter_map(|licence| {
            let c = classify(licence.expiration_date, now, bands);
            c.tier.is_alert().then(|| Alert {
                licence,
                tier: c.tier,
                days_delta: c.days_delta,
                message: c.message,
            })
        })
        .collect();

    alerts.sort_by(|a, b| {
        a.tier
            .priority()
            .cmp(&b.tier.priority())
            .then(a.days_delta.cmp(&b.days_delta))
            .then_with(|| a.licence.software_name.cmp(&b.licence.software_name))
    });
    alerts
}
