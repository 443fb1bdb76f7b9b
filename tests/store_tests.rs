// Integration tests for snapshot persistence
//
// Verifies the file-backed store end to end: key naming on disk, full
// snapshot replacement, first-access seeding, and snapshots written by
// the original product's camelCase JSON remaining readable.

use anyhow::Result;
use psikoscribe::model::{default_plans, Role, Transcript, User};
use psikoscribe::store::{DataStore, FileStore, SnapshotStore};
use psikoscribe::SessionRecord;
use std::sync::Arc;
use tempfile::TempDir;

fn file_store() -> Result<(DataStore, TempDir)> {
    let temp_dir = TempDir::new()?;
    let store = DataStore::new(Arc::new(FileStore::new(temp_dir.path())?));
    Ok((store, temp_dir))
}

fn session(id: &str, alias: &str) -> SessionRecord {
    SessionRecord {
        id: id.to_string(),
        date: "2026-02-10".parse().unwrap(),
        title: "Seans Kaydı".to_string(),
        client_alias: Some(alias.to_string()),
        session_number: None,
        duration: 60,
        transcript: Transcript::Raw("P: Merhaba.".to_string()),
        report: None,
        critique: None,
        critique_approach: None,
        bulk_analysis_id: None,
    }
}

#[test]
fn test_first_credit_load_seeds_free_tier() -> Result<()> {
    let (store, dir) = file_store()?;

    let credits = store.load_credits("user-1")?;
    assert_eq!(credits.plan, "Free");
    assert_eq!(credits.remaining_seconds, 300);

    // Seeding is persisted immediately, under the per-user key.
    assert!(dir.path().join("psikoscribe_credits_user-1.json").exists());
    Ok(())
}

#[test]
fn test_sessions_round_trip_and_replace() -> Result<()> {
    let (store, _dir) = file_store()?;

    assert!(store.load_sessions("user-1")?.is_empty());

    store.save_sessions("user-1", &[session("a", "DN-01"), session("b", "DN-02")])?;
    assert_eq!(store.load_sessions("user-1")?.len(), 2);

    // Saves replace the whole snapshot, they never merge.
    store.save_sessions("user-1", &[session("c", "DN-03")])?;
    let sessions = store.load_sessions("user-1")?;
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].id, "c");
    Ok(())
}

#[test]
fn test_user_namespaces_are_isolated() -> Result<()> {
    let (store, _dir) = file_store()?;

    store.save_sessions("user-1", &[session("a", "DN-01")])?;
    assert!(store.load_sessions("user-2")?.is_empty());
    Ok(())
}

#[test]
fn test_plans_fall_back_to_defaults_until_edited() -> Result<()> {
    let (store, _dir) = file_store()?;

    assert_eq!(store.load_plans()?, default_plans());

    let mut edited = default_plans();
    edited[0].price = "₺349".to_string();
    edited[0].minutes = 350;
    store.save_plans(&edited)?;

    let reloaded = store.load_plans()?;
    assert_eq!(reloaded[0].price, "₺349");
    assert_eq!(reloaded[0].minutes, 350);
    Ok(())
}

#[test]
fn test_active_user_save_load_clear() -> Result<()> {
    let (store, _dir) = file_store()?;

    assert!(store.load_active_user()?.is_none());

    let user = User {
        id: "user-1".to_string(),
        name: "Demo Kullanıcı".to_string(),
        email: "demo@demo.com".to_string(),
        role: Role::User,
        plan: "Free".to_string(),
        joined_date: None,
    };
    store.save_active_user(&user)?;
    assert_eq!(store.load_active_user()?.unwrap().id, "user-1");

    store.clear_active_user()?;
    assert!(store.load_active_user()?.is_none());
    Ok(())
}

#[test]
fn test_reads_snapshot_written_by_earlier_build() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let backend = Arc::new(FileStore::new(temp_dir.path())?);

    // Shape the original product persisted: camelCase fields, raw string
    // transcript.
    backend.save(
        "psikoscribe_sessions_user-1",
        r#"[{"id":"legacy","date":"2025-11-03","title":"Seans Kaydı","clientAlias":"DN-01","duration":540,"transcript":"P: Merhaba.\nD: Merhaba."}]"#,
    )?;
    backend.save(
        "psikoscribe_credits_user-1",
        r#"{"plan":"Standart","remainingSeconds":1200,"totalSeconds":30300}"#,
    )?;

    let store = DataStore::new(backend);

    let sessions = store.load_sessions("user-1")?;
    assert_eq!(sessions[0].id, "legacy");
    assert!(matches!(sessions[0].transcript, Transcript::Raw(_)));

    let credits = store.load_credits("user-1")?;
    assert_eq!(credits.plan, "Standart");
    assert_eq!(credits.remaining_seconds, 1200);
    Ok(())
}
