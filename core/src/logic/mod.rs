//! Crossing detection between ropes.
//!
//! Ropes are straight segments between their first and last pin. All queries
//! are pure reads of the store; previews substitute a hypothetical pin
//! position instead of writing it.

use crate::geometry::{segment_crossing, Point2};
use crate::model::{EntityStore, Intersection, PinId, Rope, RopeId};

#[cfg(test)]
mod tests_intersection;

/// Which rope draws on top of the other at a crossing.
///
/// Higher render priority wins. On a tie the first argument wins; the full
/// sweep always passes ropes in store order, so ties resolve to the rope
/// listed first.
pub fn top_rope(a: &Rope, b: &Rope) -> RopeId {
    if a.render_priority >= b.render_priority {
        a.id
    } else {
        b.id
    }
}

fn crossing_between<F>(a: &Rope, b: &Rope, endpoints: &F) -> Option<Intersection>
where
    F: Fn(&Rope) -> Option<(Point2, Point2)>,
{
    if a.id == b.id {
        return None;
    }

    let (a0, a1) = endpoints(a)?;
    let (b0, b1) = endpoints(b)?;
    let hit = segment_crossing(a0, a1, b0, b1)?;

    Some(Intersection {
        rope_a: a.id,
        rope_b: b.id,
        point: hit.point,
        top: top_rope(a, b),
    })
}

/// Crossing between two ropes at their stored pin positions.
/// Ropes with an unresolved endpoint never cross anything.
pub fn rope_pair_intersection(store: &EntityStore, a: &Rope, b: &Rope) -> Option<Intersection> {
    crossing_between(a, b, &|rope: &Rope| store.rope_endpoints(rope))
}

/// Every crossing on the board, each unordered rope pair tested once.
pub fn all_intersections(store: &EntityStore) -> Vec<Intersection> {
    let ropes = store.ropes();
    let mut result = Vec::new();

    for i in 0..ropes.len() {
        for j in (i + 1)..ropes.len() {
            if let Some(hit) = rope_pair_intersection(store, &ropes[i], &ropes[j]) {
                result.push(hit);
            }
        }
    }

    result
}

/// Crossings of the rope owning `pin` if that pin stood at `position`.
///
/// Only the moving rope is tested against the others. The store is not
/// modified, so this is safe to call on every pointer event.
pub fn preview_intersections(store: &EntityStore, pin: PinId, position: Point2) -> Vec<Intersection> {
    let Some(moving) = store.rope_of_pin(pin) else {
        return Vec::new();
    };

    let position_of = |id: PinId| -> Option<Point2> {
        if id == pin {
            Some(position)
        } else {
            store.pin(id).map(|p| p.logic_position())
        }
    };
    let endpoints = |rope: &Rope| -> Option<(Point2, Point2)> {
        Some((position_of(rope.start_pin()?)?, position_of(rope.end_pin()?)?))
    };

    let ropes = store.ropes();
    let moving_index = ropes.iter().position(|r| r.id == moving.id).unwrap_or(0);

    ropes
        .iter()
        .enumerate()
        .filter(|(_, other)| other.id != moving.id)
        .filter_map(|(i, other)| {
            // Keep store order so ties resolve exactly like the full sweep
            if i < moving_index {
                crossing_between(other, moving, &endpoints)
            } else {
                crossing_between(moving, other, &endpoints)
            }
        })
        .collect()
}

pub fn preview_intersection_count(store: &EntityStore, pin: PinId, position: Point2) -> usize {
    preview_intersections(store, pin, position).len()
}
