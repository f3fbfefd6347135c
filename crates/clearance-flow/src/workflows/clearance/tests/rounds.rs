use chrono::TimeZone;
use chrono::Utc;

use super::common::*;
use crate::workflows::clearance::repository::{ClearanceStore, NewRound};
use crate::workflows::clearance::ClearanceError;

#[test]
fn round_snapshots_the_current_catalog() {
    let world = world();
    let round = open_round(&world);

    assert_eq!(round.programs.len(), 2);
    assert!(round.programs.contains(&world.iron_club.id));
    assert!(round.programs.contains(&world.fuel_club.id));
}

#[test]
fn later_catalog_additions_only_join_the_next_round() {
    let world = world();
    let first = open_round(&world);

    let library = world.campus.add_program("Library", "Returned books check");

    let refreshed = world
        .app
        .rounds
        .get_round(first.id)
        .expect("first round still readable");
    assert_eq!(refreshed.programs.len(), 2);
    assert!(!refreshed.programs.contains(&library.id));

    let second = world
        .app
        .rounds
        .create_round("2nd Semester", "2025-2026")
        .expect("second round created");
    assert_eq!(second.programs.len(), 3);
    assert!(second.programs.contains(&library.id));
}

#[test]
fn latest_round_orders_by_created_at_then_id() {
    let world = world();
    let earlier = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).single().expect("valid");
    let later = Utc.with_ymd_and_hms(2025, 11, 3, 8, 0, 0).single().expect("valid");

    world
        .store
        .insert_round(NewRound {
            programs: Vec::new(),
            semester: "1st Semester".to_string(),
            academic_year: "2025-2026".to_string(),
            created_at: later,
            updated_at: later,
        })
        .expect("insert");
    world
        .store
        .insert_round(NewRound {
            programs: Vec::new(),
            semester: "Summer".to_string(),
            academic_year: "2024-2025".to_string(),
            created_at: earlier,
            updated_at: earlier,
        })
        .expect("insert");

    let latest = world.app.rounds.latest_round().expect("latest resolves");
    assert_eq!(latest.semester, "1st Semester");

    // Equal timestamps fall back to id order: the later insertion wins.
    let tied = world
        .store
        .insert_round(NewRound {
            programs: Vec::new(),
            semester: "1st Semester".to_string(),
            academic_year: "2025-2026".to_string(),
            created_at: later,
            updated_at: later,
        })
        .expect("insert");
    let latest = world.app.rounds.latest_round().expect("latest resolves");
    assert_eq!(latest.id, tied.id);
}

#[test]
fn latest_round_is_not_found_when_none_exist() {
    let world = world();
    match world.app.rounds.latest_round() {
        Err(ClearanceError::NotFound { entity }) => assert_eq!(entity, "clearance round"),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn get_round_reports_missing_ids() {
    let world = world();
    open_round(&world);
    let missing = crate::workflows::clearance::domain::RoundId(99);
    assert!(matches!(
        world.app.rounds.get_round(missing),
        Err(ClearanceError::NotFound { .. })
    ));
}

#[test]
fn list_rounds_returns_newest_first() {
    let world = world();
    let first = open_round(&world);
    let second = world
        .app
        .rounds
        .create_round("2nd Semester", "2025-2026")
        .expect("second round created");

    let rounds = world.app.rounds.list_rounds().expect("list");
    assert_eq!(rounds.len(), 2);
    assert_eq!(rounds[0].id, second.id);
    assert_eq!(rounds[1].id, first.id);
}
