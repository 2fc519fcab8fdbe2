//! Turns crossings into over/under render paths.
//!
//! Each rope starts as the straight run through its pins. Wherever the rope is
//! the top of a crossing, a detour from the [`WeaveGenerator`] is spliced in
//! after the nearest path segment. Ropes at the bottom of a crossing stay straight.

use super::helix::{generator_for, WeaveGenerator};
use crate::config::WeaveConfig;
use crate::geometry::utils_2d::{distance, distance_point_to_segment};
use crate::geometry::{flatten, lift, Point2, Point3, Vector3};
use crate::model::{EntityStore, Intersection, Rope, RopeId};

/// Distance in the board plane from the first path point to `point`.
/// Used to order crossings along a rope.
pub fn distance_along_path(path: &[Point3], point: &Point2) -> f64 {
    if path.len() < 2 {
        return 0.0;
    }
    distance(&flatten(&path[0]), point)
}

/// Direction of travel, first point to last. Exact for two-pin ropes.
pub fn path_tangent(path: &[Point3]) -> Vector3 {
    if path.len() < 2 {
        return Vector3::x();
    }

    let direction = path[path.len() - 1] - path[0];
    if direction.norm_squared() < 0.001 {
        return Vector3::x();
    }
    direction.normalize()
}

/// Start index of the path segment closest to `point` in the board plane.
pub fn closest_segment_index(path: &[Point3], point: &Point2) -> Option<usize> {
    let mut closest = None;
    let mut min_dist = f64::INFINITY;

    for (i, pair) in path.windows(2).enumerate() {
        let d = distance_point_to_segment(&flatten(&pair[0]), &flatten(&pair[1]), point);
        if d < min_dist {
            min_dist = d;
            closest = Some(i);
        }
    }

    closest
}

/// Render positions of a rope's pins, in rope order. Missing pins are skipped.
pub fn base_path(store: &EntityStore, rope: &Rope) -> Vec<Point3> {
    rope.pins
        .iter()
        .filter_map(|id| store.pin(*id))
        .map(|pin| pin.render_position())
        .collect()
}

pub struct PathWeaver {
    generator: Box<dyn WeaveGenerator>,
    tube_radius: f64,
}

impl PathWeaver {
    pub fn new(generator: Box<dyn WeaveGenerator>, tube_radius: f64) -> Self {
        Self { generator, tube_radius }
    }

    pub fn from_config(config: &WeaveConfig) -> Self {
        Self::new(generator_for(config), config.tube_radius)
    }

    /// Splice a detour into `path` for every crossing where `rope` is on top.
    ///
    /// Crossings are ordered by distance from the path start and inserted back
    /// to front, so indices of crossings earlier on the path stay valid.
    pub fn weave(&self, mut path: Vec<Point3>, rope: RopeId, intersections: &[Intersection]) -> Vec<Point3> {
        if path.len() < 2 {
            return path;
        }

        let mut on_top: Vec<(f64, &Intersection)> = intersections
            .iter()
            .filter(|hit| hit.top == rope && hit.involves(rope))
            .map(|hit| (distance_along_path(&path, &hit.point), hit))
            .collect();
        on_top.sort_by(|a, b| a.0.total_cmp(&b.0));

        for (_, hit) in on_top.into_iter().rev() {
            let tangent = path_tangent(&path);
            let detour = self.generator.generate(lift(&hit.point), tangent, self.tube_radius);
            if detour.is_empty() {
                continue;
            }

            let Some(index) = closest_segment_index(&path, &hit.point) else {
                continue;
            };
            path.splice(index + 1..index + 1, detour);
        }

        path
    }

    pub fn weave_rope(&self, store: &EntityStore, rope: &Rope, intersections: &[Intersection]) -> Vec<Point3> {
        self.weave(base_path(store, rope), rope.id, intersections)
    }

    /// Rebuild every rope's render path from the given crossing set.
    pub fn weave_all(&self, store: &mut EntityStore, intersections: &[Intersection]) {
        let paths: Vec<Vec<Point3>> = store
            .ropes()
            .iter()
            .map(|rope| self.weave_rope(store, rope, intersections))
            .collect();

        for (rope, path) in store.ropes_mut().iter_mut().zip(paths) {
            rope.set_render_path(path);
        }
    }
}
