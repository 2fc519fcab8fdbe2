use super::*;
use crate::geometry::{ApproxEq, Point2};
use crate::level::LevelDef;
use crate::model::{Pin, RopeColor, Slot, SlotId};

fn demo_store() -> EntityStore {
    let data = LevelDef::crossing_demo().build().expect("demo builds");
    EntityStore::from_parts(data.slots, data.pins, data.ropes).expect("demo loads")
}

/// Slots at the given positions, one rope per consecutive slot pair.
fn store_from_segments(segments: &[([f64; 2], [f64; 2])], priorities: &[i32]) -> EntityStore {
    let mut slots = Vec::new();
    let mut pins = Vec::new();
    let mut ropes = Vec::new();

    for (i, (start, end)) in segments.iter().enumerate() {
        let rope = RopeId(i as u32);
        let mut pin_ids = Vec::new();
        for p in [start, end] {
            let n = slots.len() as u32;
            slots.push(Slot::new(SlotId(n), Point2::new(p[0], p[1])));
            pins.push(Pin::new(PinId(n), SlotId(n), rope));
            pin_ids.push(PinId(n));
        }
        ropes.push(Rope::new(rope, RopeColor::default(), pin_ids, priorities[i]));
    }

    EntityStore::from_parts(slots, pins, ropes).expect("valid layout")
}

#[test]
fn test_demo_crosses_once_at_center() {
    let store = demo_store();
    let hits = all_intersections(&store);

    assert_eq!(hits.len(), 1);
    let hit = hits[0];
    assert_eq!(hit.rope_a, RopeId(0));
    assert_eq!(hit.rope_b, RopeId(1));
    assert!(hit.point.approx_eq(&Point2::new(0.0, 0.0)));
    // Rope 1 has the higher default priority
    assert_eq!(hit.top, RopeId(1));
    assert_eq!(hit.bottom(), RopeId(0));
}

#[test]
fn test_priority_tie_prefers_first_rope() {
    let store = store_from_segments(
        &[([0.0, 0.0], [4.0, 4.0]), ([0.0, 4.0], [4.0, 0.0])],
        &[3, 3],
    );
    let ropes = store.ropes();

    let forward = rope_pair_intersection(&store, &ropes[0], &ropes[1]).expect("crosses");
    assert_eq!(forward.top, RopeId(0));

    let backward = rope_pair_intersection(&store, &ropes[1], &ropes[0]).expect("crosses");
    assert_eq!(backward.top, RopeId(1));

    // The sweep always uses store order
    for _ in 0..3 {
        assert_eq!(all_intersections(&store)[0].top, RopeId(0));
    }
}

#[test]
fn test_top_follows_priority_regardless_of_order() {
    let store = store_from_segments(
        &[([0.0, 0.0], [4.0, 4.0]), ([0.0, 4.0], [4.0, 0.0])],
        &[1, 7],
    );
    let ropes = store.ropes();

    let forward = rope_pair_intersection(&store, &ropes[0], &ropes[1]).expect("crosses");
    let backward = rope_pair_intersection(&store, &ropes[1], &ropes[0]).expect("crosses");
    assert_eq!(forward.top, RopeId(1));
    assert_eq!(backward.top, RopeId(1));
    assert!(forward.point.approx_eq(&backward.point));
}

#[test]
fn test_self_pair_never_recorded() {
    let store = demo_store();
    let rope = &store.ropes()[0];
    assert!(rope_pair_intersection(&store, rope, rope).is_none());
}

#[test]
fn test_ropes_sharing_a_pin_do_not_cross() {
    let data = LevelDef::crossing_demo().build().expect("demo builds");
    let mut ropes = data.ropes;
    // A third rope from rope 0's start pin to rope 1's end pin
    ropes.push(Rope::new(RopeId(2), RopeColor::default(), vec![PinId(0), PinId(3)], 0));
    let store = EntityStore::from_parts(data.slots, data.pins, ropes).expect("loads");

    let hits = all_intersections(&store);
    assert!(hits.iter().all(|h| !(h.involves(RopeId(2)) && h.involves(RopeId(0)))));
    assert!(hits.iter().all(|h| !(h.involves(RopeId(2)) && h.involves(RopeId(1)))));
}

#[test]
fn test_rope_with_missing_pin_is_skipped() {
    let data = LevelDef::crossing_demo().build().expect("demo builds");
    let mut ropes = data.ropes;
    ropes.push(Rope::new(RopeId(9), RopeColor::default(), vec![PinId(0), PinId(77)], 0));
    ropes.push(Rope::new(RopeId(10), RopeColor::default(), vec![PinId(1)], 0));
    let store = EntityStore::from_parts(data.slots, data.pins, ropes).expect("loads");

    let hits = all_intersections(&store);
    assert_eq!(hits.len(), 1);
    assert!(!hits[0].involves(RopeId(9)));
    assert!(!hits[0].involves(RopeId(10)));
}

#[test]
fn test_full_recompute_is_idempotent() {
    let store = store_from_segments(
        &[
            ([0.0, 0.0], [10.0, 0.0]),
            ([3.0, -2.0], [3.0, 2.0]),
            ([7.0, -2.0], [7.0, 2.0]),
            ([0.0, 1.0], [10.0, -1.0]),
        ],
        &[0, 1, 2, 3],
    );

    let first = all_intersections(&store);
    let second = all_intersections(&store);
    assert_eq!(first, second);
    assert_eq!(first.len(), 5);
}

#[test]
fn test_preview_counts_only_moving_rope() {
    let store = store_from_segments(
        &[
            ([0.0, 0.0], [10.0, 0.0]),
            ([3.0, -2.0], [3.0, 2.0]),
            ([7.0, -2.0], [7.0, 2.0]),
        ],
        &[0, 1, 2],
    );
    let before = all_intersections(&store);

    // Pin 1 is rope 0's end; pull it back so the rope only reaches x = 5
    let hits = preview_intersections(&store, PinId(1), Point2::new(5.0, 0.0));
    assert_eq!(hits.len(), 1);
    assert!(hits[0].involves(RopeId(0)) && hits[0].involves(RopeId(1)));
    assert_eq!(hits[0].rope_a, RopeId(0));

    // Dragging pin 2 (rope 1) sideways past rope 2 still only tests rope 1
    assert_eq!(preview_intersection_count(&store, PinId(2), Point2::new(9.0, -2.0)), 2);

    // Nothing was written
    assert!(store.pin(PinId(1)).expect("pin").logic_position().approx_eq(&Point2::new(10.0, 0.0)));
    assert_eq!(all_intersections(&store), before);
}

#[test]
fn test_preview_keeps_store_order_for_ties() {
    let store = store_from_segments(
        &[([0.0, 0.0], [4.0, 4.0]), ([0.0, 4.0], [4.0, 1.0])],
        &[5, 5],
    );
    // Move rope 1's end so it still crosses rope 0
    let hits = preview_intersections(&store, PinId(3), Point2::new(4.0, 0.0));
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].rope_a, RopeId(0));
    assert_eq!(hits[0].top, RopeId(0));
}

#[test]
fn test_preview_unknown_pin() {
    let store = demo_store();
    assert!(preview_intersections(&store, PinId(99), Point2::origin()).is_empty());
}
