//! Search and filtering over licence lists.

use crate::bands::{BandConfig, Tier};
use crate::classify::classify;
use chrono::{DateTime, Utc};
use lictrack_types::{Licence, LicenceType};

/// Criteria for narrowing a licence list. Every set criterion must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LicenceFilter {
    /// Case-insensitive substring of name, vendor, version or assignee.
    pub term: Option<String>,
    pub licence_type: Option<LicenceType>,
    /// Exact vendor match.
    pub vendor: Option<String>,
    /// Keep only licences inside the alerting window but not expired.
    pub expiring_soon: bool,
    /// Keep only expired licences.
    pub expired: bool,
}

impl LicenceFilter {
    #[must_use]
    pub fn matches(&self, licence: &Licence, now: DateTime<Utc>, bands: &BandConfig) -> bool {
        if let Some(term) = self.term.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let term = term.to_lowercase();
            let hit = [
                Some(licence.software_name.as_str()),
                Some(licence.vendor.as_str()),
                Some(licence.version.as_str()),
                licence.assigned_to.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }
        if self.licence_type.is_some_and(|t| t != licence.licence_type) {
            return false;
        }
        if self.vendor.as_deref().is_some_and(|v| v != licence.vendor) {
            return false;
        }
        if self.expiring_soon || self.expired {
            let tier = classify(licence.expiration_date, now, bands).tier;
            if self.expiring_soon && !(tier.is_alert() && tier != Tier::Expired) {
                return false;
            }
            if self.expired && tier != Tier::Expired {
                return false;
            }
        }
        true
    }

    #[must_use]
    pub fn apply<'a>(&self, licences: &'a [Licence], now: DateTime<Utc>, bands: &BandConfig) -> Vec<&'a Licence> {
        licences
            .iter()
            .filter(|l| self.matches(l, now, bands))
            .collect()
    }
}
