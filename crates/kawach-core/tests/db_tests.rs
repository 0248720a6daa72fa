use std::{sync::Barrier, thread};

use kawach_core::{
    db::{assignment_queries::NewAssignment, migrations::SCHEMA_VERSION},
    models::RunResult,
    settle_run, AssignmentKind, Database, KawachError,
};
use tempfile::NamedTempFile;

/// Helper function to create a temporary database for testing
fn create_test_db() -> (NamedTempFile, Database) {
    let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
    let db = Database::new(temp_file.path()).expect("Failed to create test database");
    (temp_file, db)
}

fn quiz(id: &str) -> NewAssignment<'_> {
    NewAssignment {
        id,
        title: "Fire safety quiz",
        kind: AssignmentKind::Quiz,
        content_id: "fire-quiz-1",
        due_date: None,
        assigned_by: "ms-rao",
    }
}

#[test]
fn test_database_initialization() {
    let (temp_file, db) = create_test_db();
    assert!(temp_file.path().exists());
    assert_eq!(db.schema_version().unwrap(), SCHEMA_VERSION);
}

#[test]
fn test_progress_survives_reopen() {
    let (temp_file, mut db) = create_test_db();
    db.create_assignment(&quiz("asg-1")).unwrap();
    db.credit_xp("asha", 700).unwrap();
    db.mark_assignment_completed("asha", "asg-1").unwrap();
    drop(db);

    let mut reopened = Database::new(temp_file.path()).unwrap();
    let progress = reopened.credit_xp("asha", 400).unwrap();
    assert_eq!(progress.xp, 1_100);
    assert_eq!(progress.level, 2);
    assert_eq!(progress.completed_assignments, 1);
    assert!(reopened.is_assignment_completed("asha", "asg-1").unwrap());
}

#[test]
fn test_unknown_learner_starts_at_level_one() {
    let (_temp_file, db) = create_test_db();
    let progress = db.get_progress("new-learner").unwrap();
    assert_eq!(progress.xp, 0);
    assert_eq!(progress.level, 1);
    assert_eq!(progress.completed_assignments, 0);
}

#[test]
fn test_duplicate_assignment_id() {
    let (_temp_file, mut db) = create_test_db();
    db.create_assignment(&quiz("asg-1")).unwrap();
    assert!(matches!(
        db.create_assignment(&quiz("asg-1")),
        Err(KawachError::Database { .. })
    ));
}

#[test]
fn test_completion_recorded_once() {
    let (_temp_file, mut db) = create_test_db();
    db.create_assignment(&quiz("asg-1")).unwrap();

    assert!(db.mark_assignment_completed("asha", "asg-1").unwrap());
    assert!(!db.mark_assignment_completed("asha", "asg-1").unwrap());

    let entries = db.list_assignments(Some("asha")).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].completions, 1);
    assert!(entries[0].completed_at.is_some());
}

#[test]
fn test_settle_xp_credits_once_per_assignment() {
    let (_temp_file, mut db) = create_test_db();
    db.create_assignment(&quiz("asg-1")).unwrap();

    let progress = db.settle_xp("asha", Some("asg-1"), 30).unwrap().unwrap();
    assert_eq!(progress.xp, 30);
    assert_eq!(progress.completed_assignments, 1);

    assert!(db.settle_xp("asha", Some("asg-1"), 30).unwrap().is_none());
    assert_eq!(db.get_progress("asha").unwrap().xp, 30);

    assert_eq!(db.settle_xp("asha", None, 5).unwrap().unwrap().xp, 35);
}

#[test]
fn test_settle_xp_unknown_assignment_writes_nothing() {
    let (_temp_file, mut db) = create_test_db();
    assert!(matches!(
        db.settle_xp("asha", Some("missing"), 30),
        Err(KawachError::Database { .. })
    ));
    assert_eq!(db.get_progress("asha").unwrap().xp, 0);
}

#[test]
fn test_concurrent_settlements_credit_once() {
    const ROUNDS: usize = 50;

    let (temp_file, mut db) = create_test_db();
    let ids: Vec<String> = (0..ROUNDS).map(|i| format!("asg-{i}")).collect();
    for id in &ids {
        db.create_assignment(&quiz(id)).unwrap();
    }
    drop(db);

    let result = RunResult {
        score: 10,
        reaction_secs: None,
        evacuation_secs: None,
        awarded_xp: 10,
    };
    let barrier = Barrier::new(2);

    let credited: usize = thread::scope(|scope| {
        let workers: Vec<_> = (0..2)
            .map(|_| {
                scope.spawn(|| {
                    let mut credited = 0;
                    for id in &ids {
                        let mut db = Database::new(temp_file.path()).unwrap();
                        barrier.wait();
                        let settlement =
                            settle_run(&mut db, "asha", Some(id.as_str()), &result).unwrap();
                        if !settlement.already_completed {
                            credited += 1;
                        }
                    }
                    credited
                })
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).sum()
    });

    assert_eq!(credited, ROUNDS);
    let progress = Database::new(temp_file.path())
        .unwrap()
        .get_progress("asha")
        .unwrap();
    assert_eq!(progress.xp, 10 * ROUNDS as u64);
    assert_eq!(progress.completed_assignments, ROUNDS as u32);
}
