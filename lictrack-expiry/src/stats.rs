//! Inventory-wide statistics.

use crate::bands::{BandConfig, Tier};
use crate::classify::classify;
use chrono::{DateTime, Utc};
use lictrack_types::{Licence, LicenceType};
use serde::Serialize;
use std::collections::BTreeMap;

/// Licence counts per expiration state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExpirationBreakdown {
    pub expired: usize,
    /// Not yet expired but inside the alerting window.
    pub expiring_soon: usize,
    pub valid: usize,
    pub unknown: usize,
}

/// Aggregate view of a licence inventory.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InventoryStats {
    pub total: usize,
    pub total_seats: u64,
    pub by_type: BTreeMap<LicenceType, usize>,
    pub by_vendor: BTreeMap<String, usize>,
    pub expiration: ExpirationBreakdown,
    pub total_cost: f64,
    pub average_cost: f64,
}

impl InventoryStats {
    #[must_use]
    pub fn compute(licences: &[Licence], now: DateTime<Utc>, bands: &BandConfig) -> Self {
        let mut stats = Self {
            total: licences.len(),
            ..Default::default()
        };

        for licence in licences {
            *stats.by_type.entry(licence.licence_type).or_default() += 1;
            *stats.by_vendor.entry(licence.vendor.clone()).or_default() += 1;
            stats.total_seats += u64::from(licence.seats);
            stats.total_cost += licence.initial_cost;

            match classify(licence.expiration_date, now, bands).tier {
                Tier::Expired => stats.expiration.expired += 1,
                Tier::Active => stats.expiration.valid += 1,
                Tier::Unknown => stats.expiration.unknown += 1,
                _ => stats.expiration.expiring_soon += 1,
            }
        }

        if stats.total > 0 {
            stats.average_cost = stats.total_cost / stats.total as f64;
        }
        stats
    }
}
