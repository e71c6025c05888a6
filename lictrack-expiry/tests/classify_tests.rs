mod common;

use chrono::{NaiveDate, TimeZone, Utc};
use common::{day_offset, now};
use lictrack_expiry::{classify, classify_str, days_until, BandConfig, Classifier, Tier};
use lictrack_types::FixedClock;

fn single() -> BandConfig {
    BandConfig::default()
}

// ── Scenarios ────────────────────────────────────────────────────

#[test]
fn expiring_today_is_warning_with_zero_days() {
    let c = classify(Some(day_offset(0)), now(), &single());
    assert_eq!(c.tier, Tier::Warning);
    assert_eq!(c.days_delta, 0);
    assert_eq!(c.message, "Expires today");
}

#[test]
fn thirty_one_days_out_is_active() {
    let c = classify(Some(day_offset(31)), now(), &single());
    assert_eq!(c.tier, Tier::Active);
    assert_eq!(c.days_delta, 31);
}

#[test]
fn thirty_days_out_is_warning() {
    let c = classify(Some(day_offset(30)), now(), &single());
    assert_eq!(c.tier, Tier::Warning);
    assert_eq!(c.days_delta, 30);
    assert_eq!(c.message, "Expires in 30 day(s)");
}

#[test]
fn forty_days_ago_is_expired() {
    let c = classify(Some(day_offset(-40)), now(), &single());
    assert_eq!(c.tier, Tier::Expired);
    assert_eq!(c.days_delta, 40);
    assert_eq!(c.message, "Expired 40 day(s) ago");
}

#[test]
fn yesterday_is_expired_by_one_day() {
    let c = classify(Some(day_offset(-1)), now(), &single());
    assert_eq!(c.tier, Tier::Expired);
    assert_eq!(c.days_delta, 1);
}

#[test]
fn missing_date_is_unknown() {
    let c = classify(None, now(), &single());
    assert_eq!(c.tier, Tier::Unknown);
    assert_eq!(c.days_delta, 0);
}

// ── Day arithmetic ───────────────────────────────────────────────

#[test]
fn days_until_at_exact_midnight() {
    let midnight = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
    assert_eq!(days_until(date, midnight), 0);
    assert_eq!(days_until(date.succ_opt().unwrap(), midnight), 1);
    assert_eq!(days_until(date.pred_opt().unwrap(), midnight), -1);
}

#[test]
fn days_until_rounds_partial_days_up() {
    let late = Utc.with_ymd_and_hms(2024, 6, 15, 23, 59, 59).unwrap();
    let tomorrow = NaiveDate::from_ymd_opt(2024, 6, 16).unwrap();
    assert_eq!(days_until(tomorrow, late), 1);
}

// ── String input ─────────────────────────────────────────────────

#[test]
fn classify_str_accepts_iso_date_and_rfc3339() {
    let iso = classify_str(Some("2024-06-20"), now(), &single());
    assert_eq!(iso.tier, Tier::Warning);
    assert_eq!(iso.days_delta, 5);

    let rfc = classify_str(Some("2024-06-20T08:00:00Z"), now(), &single());
    assert_eq!(rfc.days_delta, 5);
}

#[test]
fn classify_str_malformed_is_unknown() {
    for raw in [Some("not a date"), Some("2024-13-45"), Some("   "), Some(""), None] {
        let c = classify_str(raw, now(), &single());
        assert_eq!(c.tier, Tier::Unknown, "input {raw:?}");
    }
}

// ── Three-band policy ────────────────────────────────────────────

#[test]
fn three_band_tiers() {
    let bands = BandConfig::three_band_default();
    let tier = |d| classify(Some(day_offset(d)), now(), &bands).tier;
    assert_eq!(tier(-3), Tier::Expired);
    assert_eq!(tier(0), Tier::Danger);
    assert_eq!(tier(7), Tier::Danger);
    assert_eq!(tier(12), Tier::Warn);
    assert_eq!(tier(30), Tier::Safe);
    assert_eq!(tier(45), Tier::Active);
}

#[test]
fn band_config_from_str() {
    assert_eq!("single".parse::<BandConfig>().unwrap(), BandConfig::default());
    assert_eq!(
        "three-band".parse::<BandConfig>().unwrap(),
        BandConfig::three_band_default()
    );
    assert!("five-band".parse::<BandConfig>().is_err());
}

#[test]
fn band_config_serde_is_tagged() {
    let json = serde_json::to_value(BandConfig::three_band_default()).unwrap();
    assert_eq!(json["policy"], "three_band");
    assert_eq!(json["danger"], 7);
}

// ── Classifier ───────────────────────────────────────────────────

#[test]
fn classifier_uses_injected_clock() {
    let clock = FixedClock::new(now());
    let classifier = Classifier::new(clock, BandConfig::default());
    assert_eq!(classifier.now(), now());
    assert_eq!(classifier.classify(Some(day_offset(10))).days_delta, 10);

    let later = Classifier::new(clock.shifted_days(20), BandConfig::default());
    let c = later.classify(Some(day_offset(10)));
    assert_eq!(c.tier, Tier::Expired);
    assert_eq!(c.days_delta, 10);
}
