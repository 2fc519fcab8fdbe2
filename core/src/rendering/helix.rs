//! Detour generators spliced into a rope's render path where it passes over another rope.
//!
//! The board lies in the z = 0 plane and the viewer looks down +Z, so "up" toward
//! the viewer is -Z.

use crate::config::{WeaveConfig, WeaveStyle};
use crate::geometry::{Point3, Vector3};
use std::f64::consts::PI;

/// Produces the short 3D detour inserted at a crossing.
///
/// Implementations must be deterministic: identical inputs give identical points.
pub trait WeaveGenerator: Send + Sync {
    fn generate(&self, center: Point3, tangent: Vector3, tube_radius: f64) -> Vec<Point3>;
}

fn unit_or_x(direction: Vector3) -> Vector3 {
    if direction.norm_squared() < 0.001 {
        Vector3::x()
    } else {
        direction.normalize()
    }
}

/// One wrap around the crossed rope, lifted toward the viewer on a sine profile.
#[derive(Debug, Clone, PartialEq)]
pub struct HelixWeave {
    pub height: f64,
    pub wrap_count: u32,
    pub samples: u32,
    pub radius_margin: f64,
    pub progress_length: f64,
}

impl HelixWeave {
    pub fn from_config(config: &WeaveConfig) -> Self {
        let config = config.sanitized();
        Self {
            height: config.height,
            wrap_count: config.wrap_count,
            samples: config.samples,
            radius_margin: config.radius_margin,
            progress_length: config.progress_length,
        }
    }
}

impl WeaveGenerator for HelixWeave {
    fn generate(&self, center: Point3, tangent: Vector3, tube_radius: f64) -> Vec<Point3> {
        let direction = unit_or_x(tangent);

        let mut right = direction.cross(&Vector3::z());
        if right.norm_squared() < 0.001 {
            right = direction.cross(&Vector3::y());
        }
        let right = right.normalize();
        let perp_up = right.cross(&direction).normalize();

        let helix_radius = tube_radius + self.radius_margin;
        let samples = self.samples.max(1);

        (0..=samples)
            .map(|i| {
                let t = i as f64 / samples as f64;
                let angle = t * self.wrap_count as f64 * PI * 2.0;
                let lift = self.height * (t * PI).sin();
                let radial = right * angle.cos() + perp_up * angle.sin();
                let progress = (t - 0.5) * self.progress_length;

                center + direction * progress + radial * helix_radius - Vector3::z() * lift
            })
            .collect()
    }
}

/// A plain arch over the crossing, no wrapping.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchWeave {
    pub height: f64,
    pub length: f64,
    pub samples: u32,
}

impl ArchWeave {
    pub fn from_config(config: &WeaveConfig) -> Self {
        let config = config.sanitized();
        Self {
            height: config.height,
            length: config.arch_length,
            samples: config.arch_samples,
        }
    }
}

impl WeaveGenerator for ArchWeave {
    fn generate(&self, center: Point3, tangent: Vector3, _tube_radius: f64) -> Vec<Point3> {
        let direction = unit_or_x(tangent);
        let samples = self.samples.max(1);

        (0..=samples)
            .map(|i| {
                let t = i as f64 / samples as f64;
                let progress = (t - 0.5) * self.length;
                let lift = self.height * (t * PI).sin();
                center + direction * progress - Vector3::z() * lift
            })
            .collect()
    }
}

/// Generator selected by the weave config.
pub fn generator_for(config: &WeaveConfig) -> Box<dyn WeaveGenerator> {
    match config.style {
        WeaveStyle::Helix => Box::new(HelixWeave::from_config(config)),
        WeaveStyle::Arch => Box::new(ArchWeave::from_config(config)),
    }
}
