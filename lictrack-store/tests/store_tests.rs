mod common;

use common::{draft, offline_store, online_store, store_over};
use lictrack_store::remote::mock::{MockRemote, RemoteOp};
use chrono::Utc;
use lictrack_store::{RemoteError, RemoteSource, StoreMode};
use lictrack_types::{Licence, LicenceDraft, LicencePatch, RecordId};
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

// ── init ────────────────────────────────────────────────────────

#[tokio::test]
async fn init_online_when_remote_answers() {
    let (_remote, store) = online_store().await;
    assert_eq!(store.mode(), StoreMode::Online);
    let status = store.status();
    assert!(status.online);
    assert_eq!(status.record_count, 0);
    assert_eq!(status.pending_sync, 0);
}

#[tokio::test]
async fn init_offline_when_remote_unreachable() {
    let (remote, store) = offline_store().await;
    assert_eq!(store.mode(), StoreMode::Offline);
    assert_eq!(remote.calls(RemoteOp::Count), 1);
    assert_eq!(remote.calls(RemoteOp::SelectAll), 0);
}

#[tokio::test]
async fn init_primes_cache_from_remote() {
    let (seed_remote, seed_store) = online_store().await;
    seed_store.create(draft("Office")).await;
    seed_store.create(draft("Photoshop")).await;

    let remote = Arc::new(MockRemote::with_rows(seed_remote.rows()));
    let (store, report) = store_over(&remote).await;
    assert!(report.online);
    assert_eq!(report.record_count, 2);

    remote.set_unreachable(true);
    let all = store.get_all().await;
    assert!(all.used_fallback);
    assert_eq!(all.data().map(Vec::len), Some(2));
}

#[tokio::test(start_paused = true)]
async fn init_times_out_to_offline() {
    let remote = Arc::new(MockRemote::<Licence>::new());
    remote.set_delay(Some(Duration::from_secs(10)));
    let (store, report) = store_over(&remote).await;
    assert!(!report.online);
    assert_eq!(store.mode(), StoreMode::Offline);
}

// ── create / get_all ────────────────────────────────────────────

#[tokio::test]
async fn create_then_get_all_round_trip() {
    let (_remote, store) = online_store().await;
    let input = draft("Office");

    let created = store.create(input.clone()).await;
    assert!(created.is_success());
    assert!(!created.used_fallback);

    let all = store.get_all().await.into_data().unwrap_or_default();
    let matching: Vec<_> = all.iter().filter(|l| l.matches_draft(&input)).collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].id.as_str(), "remote-1");
}

#[tokio::test]
async fn create_reports_every_invalid_field_before_io() {
    let (remote, store) = online_store().await;
    let bad = LicenceDraft {
        seats: 0,
        initial_cost: -1.0,
        ..LicenceDraft::new("", "", "1.0")
    };

    let result = store.create(bad).await;
    assert_eq!(result.error_kind(), Some("validation"));
    let fields: Vec<&str> = result
        .field_errors()
        .map(|errs| errs.iter().map(|e| e.field.as_str()).collect())
        .unwrap_or_default();
    assert_eq!(fields, vec!["software_name", "vendor", "seats", "initial_cost"]);
    assert_eq!(remote.calls(RemoteOp::Insert), 0);
    assert_eq!(store.mode(), StoreMode::Online);
}

#[tokio::test]
async fn insert_failure_falls_back_with_local_id() {
    let (remote, store) = online_store().await;
    remote.fail_next(RemoteOp::Insert, RemoteError::Connectivity("reset by peer".into()));

    let created = store.create(draft("Office")).await;
    assert!(created.is_success());
    assert!(created.used_fallback);
    let id = created.data().map(|l| l.id.clone()).unwrap_or_else(|| RecordId::new(""));
    assert!(id.is_local());
    assert_eq!(store.mode(), StoreMode::Offline);

    let all = store.get_all().await;
    assert!(all.used_fallback);
    assert!(all.data().is_some_and(|ls| ls.iter().any(|l| l.id == id)));
    assert!(remote.rows().is_empty());
}

#[tokio::test(start_paused = true)]
async fn slow_remote_counts_as_connectivity_failure() {
    let (remote, store) = online_store().await;
    remote.set_delay(Some(Duration::from_secs(30)));

    let created = store.create(draft("Office")).await;
    assert!(created.is_success());
    assert!(created.used_fallback);
    assert_eq!(store.mode(), StoreMode::Offline);
}

#[tokio::test]
async fn constraint_violation_is_validation_not_fallback() {
    let (remote, store) = online_store().await;
    remote.fail_next(RemoteOp::Insert, RemoteError::Constraint("check failed: seats".into()));

    let result = store.create(draft("Office")).await;
    assert_eq!(result.error_kind(), Some("validation"));
    assert!(!result.used_fallback);
    assert_eq!(store.mode(), StoreMode::Online);
}

#[tokio::test]
async fn read_failure_switches_offline_and_serves_cache() {
    let (remote, store) = online_store().await;
    store.create(draft("Office")).await;
    remote.fail_next(RemoteOp::SelectAll, RemoteError::Connectivity("dns".into()));

    let all = store.get_all().await;
    assert!(all.is_success());
    assert!(all.used_fallback);
    assert_eq!(all.data().map(Vec::len), Some(1));
    assert_eq!(store.mode(), StoreMode::Offline);
}

#[tokio::test]
async fn offline_stays_offline_without_reconnect() {
    let (remote, store) = offline_store().await;
    remote.set_unreachable(false);

    let created = store.create(draft("Office")).await;
    assert!(created.used_fallback);
    assert_eq!(remote.calls(RemoteOp::Insert), 0);
    assert_eq!(store.mode(), StoreMode::Offline);
}

#[tokio::test]
async fn offline_ids_never_repeat() {
    let (_remote, store) = offline_store().await;
    let mut seen = HashSet::new();
    for i in 0..50 {
        let created = store.create(draft(&format!("App {i}"))).await;
        let id = created.into_data().map(|l| l.id);
        assert!(id.as_ref().is_some_and(RecordId::is_local));
        assert!(seen.insert(id));
    }
    for id in seen.iter().take(10).flatten() {
        assert!(store.delete(id).await.is_success());
    }
    let created = store.create(draft("After deletes")).await;
    assert!(seen.insert(created.into_data().map(|l| l.id)));
}

// ── get ─────────────────────────────────────────────────────────

#[tokio::test]
async fn get_finds_record_in_both_modes() {
    let (remote, store) = online_store().await;
    let id = store.create(draft("Office")).await.into_data().map(|l| l.id).unwrap_or_else(|| RecordId::new(""));

    let online = store.get(&id).await;
    assert!(online.is_success());
    assert!(!online.used_fallback);

    remote.set_unreachable(true);
    let offline = store.get(&id).await;
    assert!(offline.is_success());
    assert!(offline.used_fallback);

    let missing = store.get(&RecordId::new("nope")).await;
    assert_eq!(missing.error_kind(), Some("not_found"));
}

#[tokio::test]
async fn get_of_unseen_row_refreshes_status() {
    let (remote, store) = online_store().await;
    let row = remote
        .insert(&draft("Visio"), &RecordId::new("local-9-00c0ffee"), Utc::now())
        .await
        .unwrap();
    assert_eq!(store.status().record_count, 0);

    let found = store.get(&row.id).await;
    assert!(found.is_success());
    assert_eq!(store.status().record_count, 1);

    remote.set_unreachable(true);
    let cached = store.get(&row.id).await;
    assert!(cached.used_fallback);
    assert_eq!(cached.into_data(), Some(row));
}

// ── update ──────────────────────────────────────────────────────

#[tokio::test]
async fn update_keeps_id_and_created_at() {
    let (_remote, store) = online_store().await;
    let original = store.create(draft("Office")).await.into_data();
    let Some(original) = original else {
        panic!("create failed");
    };

    let patch = LicencePatch {
        seats: Some(25),
        assigned_to: Some(Some("IT".into())),
        ..LicencePatch::default()
    };
    let updated = store.update(&original.id, patch).await.into_data();
    let Some(updated) = updated else {
        panic!("update failed");
    };
    assert_eq!(updated.id, original.id);
    assert_eq!(updated.created_at, original.created_at);
    assert!(updated.updated_at >= original.updated_at);
    assert_eq!(updated.seats, 25);
    assert_eq!(updated.assigned_to.as_deref(), Some("IT"));
}

#[tokio::test]
async fn update_missing_id_is_not_found_and_changes_nothing() {
    let (_remote, store) = online_store().await;
    store.create(draft("Office")).await;
    let before = store.get_all().await.into_data();

    let result = store
        .update(&RecordId::new("ghost"), LicencePatch { seats: Some(2), ..LicencePatch::default() })
        .await;
    assert_eq!(result.error_kind(), Some("not_found"));

    let after = store.get_all().await.into_data();
    assert_eq!(before, after);
}

#[tokio::test]
async fn update_validates_merged_record() {
    let (_remote, store) = online_store().await;
    let id = store.create(draft("Office")).await.into_data().map(|l| l.id).unwrap_or_else(|| RecordId::new(""));

    let result = store
        .update(&id, LicencePatch { seats: Some(0), ..LicencePatch::default() })
        .await;
    assert_eq!(result.error_kind(), Some("validation"));
    let stored = store.get(&id).await.into_data().map(|l| l.seats);
    assert_eq!(stored, Some(5));
}

#[tokio::test]
async fn update_failure_retries_against_cache() {
    let (remote, store) = online_store().await;
    let id = store.create(draft("Office")).await.into_data().map(|l| l.id).unwrap_or_else(|| RecordId::new(""));
    remote.fail_next(RemoteOp::Update, RemoteError::Connectivity("broken pipe".into()));

    let result = store
        .update(&id, LicencePatch { version: Some("3.0".into()), ..LicencePatch::default() })
        .await;
    assert!(result.is_success());
    assert!(result.used_fallback);
    assert_eq!(store.status().pending_sync, 1);
}

// ── delete ──────────────────────────────────────────────────────

#[tokio::test]
async fn delete_missing_id_is_not_found_online() {
    let (_remote, store) = online_store().await;
    store.create(draft("Office")).await;

    let result = store.delete(&RecordId::new("ghost")).await;
    assert_eq!(result.error_kind(), Some("not_found"));
    assert!(!result.used_fallback);
    assert_eq!(store.status().record_count, 1);
}

#[tokio::test]
async fn delete_missing_id_is_not_found_offline() {
    let (_remote, store) = offline_store().await;
    let result = store.delete(&RecordId::new("ghost")).await;
    assert_eq!(result.error_kind(), Some("not_found"));
    assert!(result.used_fallback);
}

#[tokio::test]
async fn delete_removes_record() {
    let (remote, store) = online_store().await;
    let id = store.create(draft("Office")).await.into_data().map(|l| l.id).unwrap_or_else(|| RecordId::new(""));

    assert!(store.delete(&id).await.is_success());
    assert!(remote.rows().is_empty());
    assert_eq!(store.status().record_count, 0);
    assert_eq!(store.delete(&id).await.error_kind(), Some("not_found"));
}

// ── status ──────────────────────────────────────────────────────

#[tokio::test]
async fn status_is_idempotent_without_mutation() {
    let (_remote, store) = online_store().await;
    store.create(draft("Office")).await;
    store.create(draft("Visio")).await;

    let first = store.status();
    for _ in 0..5 {
        assert_eq!(store.status(), first);
    }
    assert_eq!(first.record_count, 2);
}

// ── reconnect ───────────────────────────────────────────────────

#[tokio::test]
async fn reconnect_pushes_offline_journal() {
    let (remote, store) = online_store().await;
    let kept = store.create(draft("Kept")).await.into_data().map(|l| l.id).unwrap_or_else(|| RecordId::new(""));
    let doomed = store.create(draft("Doomed")).await.into_data().map(|l| l.id).unwrap_or_else(|| RecordId::new(""));

    remote.set_unreachable(true);
    store.create(draft("Offline new")).await;
    store
        .update(&kept, LicencePatch { seats: Some(42), ..LicencePatch::default() })
        .await;
    store.delete(&doomed).await;
    assert_eq!(store.status().pending_sync, 3);

    let still_down = store.reconnect().await;
    assert!(!still_down.online);
    assert_eq!(store.mode(), StoreMode::Offline);

    remote.set_unreachable(false);
    let report = store.reconnect().await;
    assert!(report.online);
    assert_eq!(report.synced, 3);
    assert_eq!(report.failed, 0);
    assert_eq!(store.mode(), StoreMode::Online);
    assert_eq!(store.status().pending_sync, 0);

    let rows = remote.rows();
    let names: HashSet<&str> = rows.iter().map(|l| l.software_name.as_str()).collect();
    assert_eq!(names, HashSet::from(["Kept", "Offline new"]));
    assert!(rows.iter().all(|l| !l.id.is_local()));
    assert!(rows.iter().any(|l| l.id == kept && l.seats == 42));
}

#[tokio::test]
async fn rejected_offline_record_keeps_store_offline() {
    let (remote, store) = offline_store().await;
    store.create(draft("Office")).await;

    remote.set_unreachable(false);
    remote.fail_next(RemoteOp::Import, RemoteError::Constraint("duplicate".into()));
    let report = store.reconnect().await;
    assert!(!report.online);
    assert_eq!(report.failed, 1);
    assert_eq!(store.mode(), StoreMode::Offline);
    assert_eq!(store.status().pending_sync, 1);

    let retry = store.reconnect().await;
    assert!(retry.online);
    assert_eq!(retry.synced, 1);
}

#[tokio::test(start_paused = true)]
async fn insert_landing_after_timeout_is_not_duplicated() {
    let (remote, store) = online_store().await;
    remote.set_reply_delay(Some(Duration::from_secs(5)));

    let created = store.create(draft("Office")).await;
    assert!(created.used_fallback);
    assert_eq!(store.mode(), StoreMode::Offline);
    assert_eq!(remote.rows().len(), 1);

    remote.set_reply_delay(None);
    let report = store.reconnect().await;
    assert!(report.online);
    assert_eq!(report.synced, 1);

    let rows = remote.rows();
    assert_eq!(rows.len(), 1);
    let all = store.get_all().await.into_data().unwrap_or_default();
    assert_eq!(all, rows);
    assert_eq!(store.status().pending_sync, 0);
}

#[tokio::test]
async fn reconnect_while_online_is_noop() {
    let (remote, store) = online_store().await;
    let report = store.reconnect().await;
    assert!(report.online);
    assert_eq!(report.synced, 0);
    assert_eq!(remote.calls(RemoteOp::Count), 1);
}

// ── concurrency ─────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_failures_do_not_duplicate_fallback_entries() {
    let (remote, store) = online_store().await;
    let store = Arc::new(store);
    remote.set_unreachable(true);

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move { store.create(draft(&format!("App {i}"))).await }));
    }
    for handle in handles {
        let result = handle.await;
        assert!(result.is_ok_and(|r| r.is_success() && r.used_fallback));
    }

    let all = store.get_all().await.into_data().unwrap_or_default();
    assert_eq!(all.len(), 8);
    assert_eq!(remote.calls(RemoteOp::Insert), 1);
}
