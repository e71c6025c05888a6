use lictrack_expiry::{BandConfig, ExpiryError};

#[test]
fn error_display_unknown_policy() {
    let err = "quad".parse::<BandConfig>().unwrap_err();
    assert_eq!(err, ExpiryError::UnknownPolicy("quad".into()));
    assert!(format!("{err}").contains("unknown band policy"));
}

#[test]
fn error_display_invalid_thresholds() {
    let err = BandConfig::three_band(20, 10, 30).unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("invalid band thresholds"));
    assert!(msg.contains("20/10/30"));
}
