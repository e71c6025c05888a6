//! Shared helpers for store tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use lictrack_store::remote::mock::MockRemote;
use lictrack_store::{InitReport, LicenceStore, StoreConfig};
use lictrack_types::{Licence, LicenceDraft, LicenceType};
use std::sync::Arc;

pub fn draft(name: &str) -> LicenceDraft {
    LicenceDraft {
        licence_type: LicenceType::Subscription,
        seats: 5,
        expiration_date: NaiveDate::from_ymd_opt(2030, 1, 31),
        initial_cost: 1200.0,
        ..LicenceDraft::new(name, "Acme", "2.1")
    }
}

pub fn config() -> StoreConfig {
    StoreConfig {
        remote_timeout_ms: 50,
        ..StoreConfig::default()
    }
}

pub async fn store_over(remote: &Arc<MockRemote<Licence>>) -> (LicenceStore, InitReport) {
    LicenceStore::init(remote.clone(), config()).await
}

pub async fn online_store() -> (Arc<MockRemote<Licence>>, LicenceStore) {
    let remote = Arc::new(MockRemote::new());
    let (store, report) = store_over(&remote).await;
    assert!(report.online);
    (remote, store)
}

pub async fn offline_store() -> (Arc<MockRemote<Licence>>, LicenceStore) {
    let remote = Arc::new(MockRemote::unreachable());
    let (store, report) = store_over(&remote).await;
    assert!(!report.online);
    (remote, store)
}
