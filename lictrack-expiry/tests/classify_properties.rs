//! Property-based tests for the classifier boundaries.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use lictrack_expiry::{classify, BandConfig, Tier};
use proptest::prelude::*;

fn instant_strategy() -> impl Strategy<Value = chrono::DateTime<Utc>> {
    // 2000-01-01 .. ~2060, any second of the day
    (0i64..22_000, 0i64..86_400).prop_map(|(day, secs)| {
        Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap() + Duration::days(day) + Duration::seconds(secs)
    })
}

proptest! {
    /// Expired iff the expiration date is strictly before today.
    #[test]
    fn expired_iff_date_before_today(now in instant_strategy(), offset in -400i64..400) {
        let date: NaiveDate = now.date_naive() + Duration::days(offset);
        let c = classify(Some(date), now, &BandConfig::default());
        prop_assert_eq!(c.tier == Tier::Expired, date < now.date_naive());
    }

    /// Offsets 0..=30 days are always in the warning band.
    #[test]
    fn within_thirty_days_is_warning(now in instant_strategy(), offset in 0i64..=30) {
        let date = now.date_naive() + Duration::days(offset);
        let c = classify(Some(date), now, &BandConfig::default());
        prop_assert_eq!(c.tier, Tier::Warning);
        prop_assert_eq!(c.days_delta, offset);
    }

    /// `days_delta` is always non-negative.
    #[test]
    fn days_delta_never_negative(now in instant_strategy(), offset in -1000i64..1000) {
        let date = now.date_naive() + Duration::days(offset);
        let c = classify(Some(date), now, &BandConfig::three_band_default());
        prop_assert!(c.days_delta >= 0);
        prop_assert_eq!(c.days_delta, offset.abs());
    }
}
