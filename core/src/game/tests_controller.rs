use super::*;
use crate::config::PuzzleConfig;
use crate::geometry::Point2;
use crate::level::{LevelDef, LevelError};
use crate::model::{Pin, PinId, RopeId, Slot, SlotId};
use std::sync::mpsc::Receiver;

fn demo() -> PuzzleController {
    let mut puzzle = PuzzleController::default();
    puzzle.load_level(&LevelDef::crossing_demo()).expect("demo loads");
    puzzle
}

fn drain(rx: &Receiver<PuzzleEvent>) -> Vec<PuzzleEvent> {
    rx.try_iter().collect()
}

#[test]
fn test_load_computes_first_crossings() {
    let mut puzzle = PuzzleController::new(PuzzleConfig::default());
    let rx = puzzle.subscribe();
    puzzle.load_level(&LevelDef::crossing_demo()).expect("demo loads");

    assert_eq!(puzzle.crossing_count(), 1);
    assert!(!puzzle.is_solved());
    assert_eq!(puzzle.intersections()[0].top, RopeId(1));
    assert_eq!(
        drain(&rx),
        vec![PuzzleEvent::RenderPathsUpdated, PuzzleEvent::CrossingCountChanged { count: 1 }]
    );

    // Every rope has a render path after load
    assert!(puzzle.ropes().iter().all(|r| r.render_path().len() >= 2));
}

#[test]
fn test_recompute_is_idempotent() {
    let mut puzzle = demo();
    let rx = puzzle.subscribe();

    puzzle.recalculate_intersections();
    let first = puzzle.intersections().to_vec();
    let first_paths: Vec<_> = puzzle.ropes().iter().map(|r| r.render_path().to_vec()).collect();

    puzzle.recalculate_intersections();
    let second_paths: Vec<_> = puzzle.ropes().iter().map(|r| r.render_path().to_vec()).collect();

    assert_eq!(first, puzzle.intersections());
    assert_eq!(first_paths, second_paths);
    assert_eq!(
        drain(&rx),
        vec![PuzzleEvent::RenderPathsUpdated, PuzzleEvent::RenderPathsUpdated]
    );
}

#[test]
fn test_snap_into_occupied_slot_is_rejected() {
    let mut puzzle = demo();
    let rx = puzzle.subscribe();

    assert!(!puzzle.snap(PinId(0), SlotId(8)));
    assert!(!puzzle.snap(PinId(0), SlotId(99)));
    assert!(!puzzle.snap(PinId(42), SlotId(4)));

    assert_eq!(puzzle.pin(PinId(0)).expect("pin 0").slot(), SlotId(0));
    assert_eq!(puzzle.pin(PinId(1)).expect("pin 1").slot(), SlotId(8));
    assert_eq!(puzzle.slot(SlotId(8)).expect("slot 8").occupant(), Some(PinId(1)));
    assert!(puzzle.store().is_consistent());
    assert!(drain(&rx).is_empty());
}

#[test]
fn test_snap_moves_pin_and_notifies() {
    let mut puzzle = demo();
    let rx = puzzle.subscribe();

    assert!(puzzle.snap(PinId(0), SlotId(3)));

    let pin = puzzle.pin(PinId(0)).expect("pin 0");
    assert_eq!(pin.slot(), SlotId(3));
    assert_eq!(pin.logic_position(), Point2::new(-2.0, 0.0));
    assert!(puzzle.slot(SlotId(0)).expect("slot 0").is_empty());
    assert!(puzzle.store().is_consistent());

    // Still one crossing, so no count notification
    assert_eq!(
        drain(&rx),
        vec![
            PuzzleEvent::RenderPathsUpdated,
            PuzzleEvent::PinSnapped { pin: PinId(0), slot: SlotId(3) },
        ]
    );
}

#[test]
fn test_solving_fires_solved_once() {
    let mut puzzle = demo();
    let rx = puzzle.subscribe();

    assert!(puzzle.snap(PinId(0), SlotId(3)));
    assert!(puzzle.snap(PinId(2), SlotId(0)));

    assert_eq!(puzzle.crossing_count(), 0);
    assert!(puzzle.is_solved());

    let events = drain(&rx);
    let solved = events.iter().filter(|e| **e == PuzzleEvent::PuzzleSolved).count();
    assert_eq!(solved, 1);
    assert!(events.contains(&PuzzleEvent::CrossingCountChanged { count: 0 }));

    // A recompute in a solved state refires solved but not the count
    puzzle.recalculate_intersections();
    assert_eq!(
        drain(&rx),
        vec![PuzzleEvent::RenderPathsUpdated, PuzzleEvent::PuzzleSolved]
    );
}

#[test]
fn test_failed_set_level_keeps_previous_board() {
    let mut puzzle = demo();
    let slots = vec![Slot::new(SlotId(0), Point2::origin())];
    let pins = vec![
        Pin::new(PinId(0), SlotId(0), RopeId(0)),
        Pin::new(PinId(1), SlotId(0), RopeId(0)),
    ];

    let err = puzzle.set_level(slots, pins, Vec::new()).expect_err("double booking");
    assert!(matches!(err, LevelError::SlotDoubleBooked { .. }));
    assert_eq!(puzzle.slots().len(), 9);
    assert_eq!(puzzle.crossing_count(), 1);
}

#[test]
fn test_preview_leaves_crossings_alone() {
    let mut puzzle = demo();
    let rx = puzzle.subscribe();

    // Pin 3 held on the left edge would remove the crossing
    assert!(puzzle.preview_pin(PinId(3), Point2::new(-2.0, -1.0)));
    assert!(puzzle.preview_crossings(PinId(3), Point2::new(-2.0, -1.0)).is_empty());

    assert_eq!(puzzle.crossing_count(), 1);
    assert_eq!(drain(&rx), vec![PuzzleEvent::RenderPathsUpdated]);
    assert!(!puzzle.preview_pin(PinId(9), Point2::origin()));
}

#[test]
fn test_snapshot_reflects_state() {
    let puzzle = demo();
    let snap = puzzle.snapshot();

    assert_eq!(snap.slots.len(), 9);
    assert_eq!(snap.pins.len(), 4);
    assert_eq!(snap.ropes.len(), 2);
    assert_eq!(snap.crossing_count, 1);
    assert!(!snap.solved);

    let json = serde_json::to_string(&snap).expect("serializes");
    let back: PuzzleSnapshot = serde_json::from_str(&json).expect("deserializes");
    assert_eq!(back.crossing_count, 1);
    assert_eq!(back.pins[2].slot(), SlotId(6));
}
