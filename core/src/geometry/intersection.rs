//! Exact 2D segment crossing test used to decide whether two ropes cross.

use super::utils_2d::cross_2d;
use super::{Point2, EPSILON};

/// A proper crossing of two segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentCrossing {
    pub point: Point2,
    /// Parameter along the first segment: point = a + t * (b - a)
    pub t: f64,
    /// Parameter along the second segment: point = c + u * (d - c)
    pub u: f64,
}

/// Test segment AB against segment CD.
///
/// Uses the parametric form with r = B - A, s = D - C. Parallel, collinear and
/// degenerate segments never cross. Both parameters must lie strictly inside
/// (EPSILON, 1 - EPSILON), so segments that only touch at an endpoint (two ropes
/// meeting at the same spot, a T-junction) are not reported.
pub fn segment_crossing(a: Point2, b: Point2, c: Point2, d: Point2) -> Option<SegmentCrossing> {
    let r = b - a;
    let s = d - c;
    let rxs = cross_2d(&r, &s);

    if rxs.abs() < EPSILON {
        return None;
    }

    let ac = c - a;
    let t = cross_2d(&ac, &s) / rxs;
    let u = cross_2d(&ac, &r) / rxs;

    let inside = |v: f64| v > EPSILON && v < 1.0 - EPSILON;
    if inside(t) && inside(u) {
        Some(SegmentCrossing { point: a + r * t, t, u })
    } else {
        None
    }
}
