use nalgebra as na;

pub type Point2 = na::Point2<f64>;
pub type Vector2 = na::Vector2<f64>;
pub type Point3 = na::Point3<f64>;
pub type Vector3 = na::Vector3<f64>;

pub const EPSILON: f64 = 1e-6;

pub trait ApproxEq {
    fn approx_eq(&self, other: &Self) -> bool;
}

impl ApproxEq for f64 {
    fn approx_eq(&self, other: &Self) -> bool {
        (self - other).abs() < EPSILON
    }
}

impl ApproxEq for Point2 {
    fn approx_eq(&self, other: &Self) -> bool {
        na::distance_squared(self, other) < EPSILON * EPSILON
    }
}

impl ApproxEq for Point3 {
    fn approx_eq(&self, other: &Self) -> bool {
        na::distance_squared(self, other) < EPSILON * EPSILON
    }
}

impl ApproxEq for Vector3 {
    fn approx_eq(&self, other: &Self) -> bool {
        (self - other).norm_squared() < EPSILON * EPSILON
    }
}

impl<T: ApproxEq> ApproxEq for [T] {
    fn approx_eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.approx_eq(b))
    }
}

pub mod utils_2d;

pub mod intersection;
pub use intersection::*;

/// Lift a board position onto the z = 0 render plane.
pub fn lift(p: &Point2) -> Point3 {
    Point3::new(p.x, p.y, 0.0)
}

/// Drop the depth component of a render position.
pub fn flatten(p: &Point3) -> Point2 {
    Point2::new(p.x, p.y)
}
