//! Database tests

use super::*;
use crate::models::*;
use chrono::TimeZone;

fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

#[test]
fn test_in_memory_db() {
    let db = Database::in_memory().unwrap();
    assert!(db.list_users().unwrap().is_empty());
    assert!(db.path().ends_with(".db"));
}

#[test]
fn test_get_or_create_user_is_idempotent() {
    let db = Database::in_memory().unwrap();

    let alice = db.get_or_create_user("alice").unwrap();
    assert!(alice.id > 0);

    let again = db.get_or_create_user("  alice ").unwrap();
    assert_eq!(alice.id, again.id);

    db.get_or_create_user("bob").unwrap();
    let names: Vec<_> = db
        .list_users()
        .unwrap()
        .into_iter()
        .map(|u| u.username)
        .collect();
    assert_eq!(names, vec!["alice", "bob"]);
}

#[test]
fn test_empty_username_rejected() {
    let db = Database::in_memory().unwrap();
    assert!(matches!(
        db.get_or_create_user("   "),
        Err(Error::InvalidInput(_))
    ));
}

#[test]
fn test_get_user_missing() {
    let db = Database::in_memory().unwrap();
    assert!(db.get_user(42).unwrap().is_none());
}

#[test]
fn test_insert_snapshot_derives_savings_rate() {
    let db = Database::in_memory().unwrap();
    let user = db.get_or_create_user("alice").unwrap();

    let snapshot = db
        .insert_snapshot(
            user.id,
            &NewSnapshot::new(5000.0, 3000.0, 10000.0, 20000.0).at(at(2024, 1, 15)),
        )
        .unwrap();

    assert_eq!(snapshot.savings_rate, 40.0);
    assert_eq!(snapshot.recorded_at, at(2024, 1, 15));

    let history = db.get_history(user.id).unwrap();
    assert_eq!(history, vec![snapshot]);
}

#[test]
fn test_savings_rate_stored_unclamped() {
    let db = Database::in_memory().unwrap();
    let user = db.get_or_create_user("alice").unwrap();

    let overspent = db
        .insert_snapshot(user.id, &NewSnapshot::new(2000.0, 3000.0, 0.0, 0.0))
        .unwrap();
    assert_eq!(overspent.savings_rate, -50.0);

    let no_income = db
        .insert_snapshot(user.id, &NewSnapshot::new(0.0, 300.0, 0.0, 0.0))
        .unwrap();
    assert_eq!(no_income.savings_rate, 0.0);
}

#[test]
fn test_history_is_ordered_by_recorded_at() {
    let db = Database::in_memory().unwrap();
    let user = db.get_or_create_user("alice").unwrap();

    // Inserted out of order, with one timestamp tie
    for (expenses, when) in [
        (300.0, at(2024, 3, 1)),
        (100.0, at(2024, 1, 1)),
        (200.0, at(2024, 2, 1)),
        (250.0, at(2024, 2, 1)),
    ] {
        db.insert_snapshot(
            user.id,
            &NewSnapshot::new(1000.0, expenses, 0.0, 0.0).at(when),
        )
        .unwrap();
    }

    let expenses: Vec<f64> = db
        .get_history(user.id)
        .unwrap()
        .iter()
        .map(|s| s.expenses)
        .collect();
    assert_eq!(expenses, vec![100.0, 200.0, 250.0, 300.0]);

    let latest = db.latest_snapshot(user.id).unwrap().unwrap();
    assert_eq!(latest.expenses, 300.0);
    assert_eq!(db.count_snapshots(user.id).unwrap(), 4);
}

#[test]
fn test_histories_are_per_user() {
    let db = Database::in_memory().unwrap();
    let alice = db.get_or_create_user("alice").unwrap();
    let bob = db.get_or_create_user("bob").unwrap();

    db.insert_snapshot(alice.id, &NewSnapshot::new(1000.0, 500.0, 0.0, 0.0))
        .unwrap();

    assert_eq!(db.get_history(alice.id).unwrap().len(), 1);
    assert!(db.get_history(bob.id).unwrap().is_empty());
    assert!(db.latest_snapshot(bob.id).unwrap().is_none());
}

#[test]
fn test_insert_snapshot_rejects_invalid_input() {
    let db = Database::in_memory().unwrap();
    let user = db.get_or_create_user("alice").unwrap();

    let err = db
        .insert_snapshot(user.id, &NewSnapshot::new(1000.0, 0.0, -5.0, 0.0))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    assert!(db.get_history(user.id).unwrap().is_empty());
}

#[test]
fn test_insert_snapshot_unknown_user() {
    let db = Database::in_memory().unwrap();
    let err = db
        .insert_snapshot(99, &NewSnapshot::new(1000.0, 0.0, 0.0, 0.0))
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_unparseable_timestamp_is_an_error() {
    let db = Database::in_memory().unwrap();
    let user = db.get_or_create_user("alice").unwrap();
    db.insert_snapshot(user.id, &NewSnapshot::new(5000.0, 3000.0, 0.0, 0.0).at(at(2024, 1, 1)))
        .unwrap();

    db.conn()
        .unwrap()
        .execute(
            "INSERT INTO snapshots (user_id, recorded_at, income, expenses, debts, investments, savings_rate)
             VALUES (?, 'last tuesday', 5000, 3000, 0, 0, 40)",
            [user.id],
        )
        .unwrap();

    let err = db.get_history(user.id).unwrap_err();
    assert!(matches!(err, Error::Database(_)));
}

#[test]
fn test_insert_snapshot_truncates_to_seconds() {
    let db = Database::in_memory().unwrap();
    let user = db.get_or_create_user("alice").unwrap();
    let when = at(2024, 5, 1) + chrono::Duration::milliseconds(750);

    let stored = db
        .insert_snapshot(user.id, &NewSnapshot::new(5000.0, 3000.0, 0.0, 0.0).at(when))
        .unwrap();
    assert_eq!(stored.recorded_at, at(2024, 5, 1));
    assert_eq!(db.get_history(user.id).unwrap()[0].recorded_at, stored.recorded_at);
}

#[test]
fn test_audit_log() {
    let db = Database::in_memory().unwrap();

    db.log_audit("api", "create_user", Some("user"), Some(1), None)
        .unwrap();
    db.log_audit("api", "get_health", Some("user"), Some(1), Some("no data"))
        .unwrap();

    let entries = db.list_audit_log(10).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].action, "get_health");
    assert_eq!(entries[0].details.as_deref(), Some("no data"));
    assert_eq!(entries[1].entity_id, Some(1));

    assert_eq!(db.list_audit_log(1).unwrap().len(), 1);
}

#[test]
fn test_encrypted_database_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vitals.db");
    let path = path.to_string_lossy();

    {
        let db = Database::new_with_key(&path, Some("correct horse")).unwrap();
        let user = db.get_or_create_user("alice").unwrap();
        db.insert_snapshot(user.id, &NewSnapshot::new(1000.0, 400.0, 0.0, 0.0))
            .unwrap();
    }

    let db = Database::new_with_key(&path, Some("correct horse")).unwrap();
    let user = db.get_user_by_name("alice").unwrap().unwrap();
    assert_eq!(db.get_history(user.id).unwrap().len(), 1);

    // A different passphrase cannot read the schema
    assert!(Database::new_with_key(&path, Some("wrong")).is_err());
}
