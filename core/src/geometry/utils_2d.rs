//! 2D helpers used by the crossing test, the slot search and the path weaver.
//!
//! Everything here is a pure function over nalgebra points so the logic
//! layer never touches render data.

use super::{Point2, Vector2, EPSILON};

/// 2D cross product (z-component of 3D cross product).
/// Positive if v2 is counter-clockwise from v1.
#[inline]
pub fn cross_2d(v1: &Vector2, v2: &Vector2) -> f64 {
    v1.x * v2.y - v1.y * v2.x
}

/// Distance between two 2D points.
#[inline]
pub fn distance(p1: &Point2, p2: &Point2) -> f64 {
    nalgebra::distance(p1, p2)
}

/// Find parameter t where point projects onto the line through `start` and `end`.
/// Returns 0 for a degenerate segment.
pub fn project_point_on_line(start: &Point2, end: &Point2, point: &Point2) -> f64 {
    let seg = end - start;
    let len_sq = seg.norm_squared();

    if len_sq < EPSILON * EPSILON {
        return 0.0;
    }

    (point - start).dot(&seg) / len_sq
}

/// Closest point on segment `start..end` to `point`.
pub fn closest_point_on_segment(start: &Point2, end: &Point2, point: &Point2) -> Point2 {
    let t = project_point_on_line(start, end, point).clamp(0.0, 1.0);
    start + (end - start) * t
}

/// Shortest distance from `point` to the segment `start..end`.
pub fn distance_point_to_segment(start: &Point2, end: &Point2, point: &Point2) -> f64 {
    distance(point, &closest_point_on_segment(start, end, point))
}
