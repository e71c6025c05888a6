//! Plain-text rendering of licences, alerts and statistics.

use chrono::{DateTime, Utc};
use lictrack_expiry::{classify, Alert, BandConfig, InventoryStats};
use lictrack_store::{StoreStatus, SyncReport};
use lictrack_types::{Licence, User};
use std::fmt::Write;

fn date_or_dash(date: Option<chrono::NaiveDate>) -> String {
    date.map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string())
}

#[must_use]
pub fn licence_table(licences: &[Licence], now: DateTime<Utc>, bands: &BandConfig) -> String {
    if licences.is_empty() {
        return "no licences\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<38} {:<24} {:<16} {:<10} {:<12} {:>5} {:<10} {:<8} {}",
        "ID", "SOFTWARE", "VENDOR", "VERSION", "TYPE", "SEATS", "EXPIRES", "STATUS", "DETAIL"
    );
    for licence in licences {
        let status = classify(licence.expiration_date, now, bands);
        let _ = writeln!(
            out,
            "{:<38} {:<24} {:<16} {:<10} {:<12} {:>5} {:<10} {:<8} {}",
            licence.id.as_str(),
            licence.software_name,
            licence.vendor,
            licence.version,
            licence.licence_type.as_str(),
            licence.seats,
            date_or_dash(licence.expiration_date),
            status.tier.as_str(),
            status.message
        );
    }
    out
}

#[must_use]
pub fn alert_list(alerts: &[Alert<'_>]) -> String {
    if alerts.is_empty() {
        return "no licences need attention\n".to_string();
    }
    let mut out = String::new();
    for alert in alerts {
        let _ = writeln!(
            out,
            "[{}] {} {} ({}): {}",
            alert.tier.as_str().to_uppercase(),
            alert.licence.software_name,
            alert.licence.version,
            alert.licence.vendor,
            alert.message
        );
    }
    out
}

#[must_use]
pub fn stats_summary(stats: &InventoryStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "licences:      {}", stats.total);
    let _ = writeln!(out, "seats:         {}", stats.total_seats);
    let _ = writeln!(out, "total cost:    {:.2}", stats.total_cost);
    let _ = writeln!(out, "average cost:  {:.2}", stats.average_cost);
    let _ = writeln!(
        out,
        "expiration:    {} expired, {} expiring soon, {} valid, {} without date",
        stats.expiration.expired,
        stats.expiration.expiring_soon,
        stats.expiration.valid,
        stats.expiration.unknown
    );
    if !stats.by_type.is_empty() {
        out.push_str("by type:\n");
        for (licence_type, count) in &stats.by_type {
            let _ = writeln!(out, "  {:<14} {}", licence_type.as_str(), count);
        }
    }
    if !stats.by_vendor.is_empty() {
        out.push_str("by vendor:\n");
        for (vendor, count) in &stats.by_vendor {
            let _ = writeln!(out, "  {:<14} {}", vendor, count);
        }
    }
    out
}

#[must_use]
pub fn user_table(users: &[User]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<20} {:<6} {}", "LOGIN", "ROLE", "NOTE");
    for user in users {
        let note = if user.must_change_password {
            "password change required"
        } else {
            ""
        };
        let _ = writeln!(out, "{:<20} {:<6} {}", user.login, user.role.as_str(), note);
    }
    out
}

#[must_use]
pub fn status_line(name: &str, status: &StoreStatus) -> String {
    format!(
        "{:<9} {}, {} record(s), {} pending sync\n",
        format!("{name}:"),
        if status.online { "online" } else { "offline" },
        status.record_count,
        status.pending_sync
    )
}

#[must_use]
pub fn sync_line(name: &str, report: &SyncReport) -> String {
    format!(
        "{:<9} {} synced, {} failed, {}\n",
        format!("{name}:"),
        report.synced,
        report.failed,
        if report.online { "online" } else { "still offline" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use lictrack_expiry::build_alert_list;
    use lictrack_types::{LicenceDraft, RecordId};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn licence(name: &str, expires: Option<NaiveDate>) -> Licence {
        let draft = LicenceDraft {
            expiration_date: expires,
            ..LicenceDraft::new(name, "Acme", "1.0")
        };
        Licence::from_draft(RecordId::new(format!("id-{name}")), &draft, now())
    }

    #[test]
    fn table_shows_status_per_row() {
        let licences = vec![
            licence("Office", NaiveDate::from_ymd_opt(2024, 6, 1)),
            licence("Visio", None),
        ];
        let table = licence_table(&licences, now(), &BandConfig::default());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("expired") && lines[1].contains("Expired 14 day(s) ago"));
        assert!(lines[2].contains("unknown") && lines[2].contains("No expiration date"));
    }

    #[test]
    fn alerts_render_most_urgent_first() {
        let licences = vec![
            licence("Soon", NaiveDate::from_ymd_opt(2024, 6, 20)),
            licence("Gone", NaiveDate::from_ymd_opt(2024, 6, 5)),
        ];
        let alerts = build_alert_list(&licences, now(), &BandConfig::default());
        let text = alert_list(&alerts);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("[EXPIRED] Gone"));
        assert!(lines[1].starts_with("[WARNING] Soon"));
    }

    #[test]
    fn empty_inputs_render_placeholders() {
        assert_eq!(licence_table(&[], now(), &BandConfig::default()), "no licences\n");
        assert_eq!(alert_list(&[]), "no licences need attention\n");
    }

    #[test]
    fn status_line_is_stable() {
        let status = StoreStatus {
            online: false,
            record_count: 3,
            pending_sync: 2,
        };
        assert_eq!(status_line("licences", &status), "licences: offline, 3 record(s), 2 pending sync\n");
    }
}
