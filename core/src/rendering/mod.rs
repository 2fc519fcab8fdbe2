//! Render-path construction: the weave generators and the path weaver.
//!
//! Tube meshing, spline smoothing and sag simulation consume these paths
//! downstream and live outside this crate.

pub mod helix;
pub use helix::{generator_for, ArchWeave, HelixWeave, WeaveGenerator};

pub mod weave;
pub use weave::PathWeaver;
