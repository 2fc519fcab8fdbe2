//! Cosmetic animations requested when a move resolves.
//!
//! The puzzle state is already final when one of these is produced; an
//! animation collaborator samples it over time and nothing waits for it.

use crate::geometry::Point3;
use crate::model::PinId;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Easing {
    Linear,
    /// Slight overshoot past the target, used for snaps
    OutBack,
    /// Springy settle, used for rollbacks
    OutElastic,
    InOutQuad,
}

impl Easing {
    /// Eased progress for `t` in [0, 1].
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::OutBack => {
                let s = 1.70158;
                let u = t - 1.0;
                1.0 + (s + 1.0) * u * u * u + s * u * u
            }
            Easing::OutElastic => {
                if t == 0.0 || t == 1.0 {
                    t
                } else {
                    let c = 2.0 * PI / 3.0;
                    2f64.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c).sin() + 1.0
                }
            }
            Easing::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TransitionKind {
    Move { from: Point3, to: Point3 },
    Scale { from: f64, to: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub pin: PinId,
    pub kind: TransitionKind,
    /// Seconds
    pub duration: f64,
    pub easing: Easing,
}

impl Transition {
    pub fn movement(pin: PinId, from: Point3, to: Point3, duration: f64, easing: Easing) -> Self {
        Self {
            pin,
            kind: TransitionKind::Move { from, to },
            duration,
            easing,
        }
    }

    pub fn scale(pin: PinId, from: f64, to: f64, duration: f64) -> Self {
        Self {
            pin,
            kind: TransitionKind::Scale { from, to },
            duration,
            easing: Easing::InOutQuad,
        }
    }

    /// Eased progress after `elapsed` seconds. A zero duration completes at once.
    pub fn progress(&self, elapsed: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        self.easing.apply(elapsed / self.duration)
    }

    pub fn is_finished(&self, elapsed: f64) -> bool {
        elapsed >= self.duration
    }

    pub fn position_at(&self, elapsed: f64) -> Option<Point3> {
        match self.kind {
            TransitionKind::Move { from, to } => Some(from + (to - from) * self.progress(elapsed)),
            TransitionKind::Scale { .. } => None,
        }
    }

    pub fn scale_at(&self, elapsed: f64) -> Option<f64> {
        match self.kind {
            TransitionKind::Scale { from, to } => Some(from + (to - from) * self.progress(elapsed)),
            TransitionKind::Move { .. } => None,
        }
    }
}
