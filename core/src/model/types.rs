use super::{PinId, RopeId, SlotId};
use crate::geometry::{lift, Point2, Point3};
use serde::{Deserialize, Serialize};

/// A fixed socket a pin may occupy.
///
/// Occupancy is only ever changed by [`super::EntityStore`], which updates the
/// slot and the pin together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub id: SlotId,
    pub position: Point2,
    #[serde(default)]
    occupant: Option<PinId>,
}

impl Slot {
    pub fn new(id: SlotId, position: Point2) -> Self {
        Self {
            id,
            position,
            occupant: None,
        }
    }

    pub fn occupant(&self) -> Option<PinId> {
        self.occupant
    }

    pub fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }

    pub(crate) fn occupy(&mut self, pin: PinId) {
        self.occupant = Some(pin);
    }

    pub(crate) fn release(&mut self) {
        self.occupant = None;
    }
}

/// A movable rope endpoint.
///
/// `logic_position` feeds the crossing test; `render_position` is what the
/// renderer draws. Both follow the pointer during a drag and are reconciled
/// to the slot on snap or rollback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub id: PinId,
    pub rope: RopeId,
    slot: SlotId,
    logic_position: Point2,
    render_position: Point3,
    scale: f64,
}

impl Pin {
    pub fn new(id: PinId, slot: SlotId, rope: RopeId) -> Self {
        Self {
            id,
            rope,
            slot,
            logic_position: Point2::origin(),
            render_position: Point3::origin(),
            scale: 1.0,
        }
    }

    pub fn slot(&self) -> SlotId {
        self.slot
    }

    pub fn logic_position(&self) -> Point2 {
        self.logic_position
    }

    pub fn render_position(&self) -> Point3 {
        self.render_position
    }

    /// Visual scale; grows while the pin is held.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub(crate) fn set_slot(&mut self, slot: SlotId) {
        self.slot = slot;
    }

    pub(crate) fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    /// Snap both positions onto the slot.
    pub(crate) fn sync_from_slot(&mut self, slot: &Slot) {
        self.logic_position = slot.position;
        self.render_position = lift(&slot.position);
    }

    /// Follow the pointer without touching slot occupancy. Keeps the render depth.
    pub(crate) fn set_preview_position(&mut self, position: Point2) {
        self.logic_position = position;
        self.render_position = Point3::new(position.x, position.y, self.render_position.z);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RopeColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl RopeColor {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

impl Default for RopeColor {
    fn default() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }
}

/// A link between pins. Only the first and last pin define its geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rope {
    pub id: RopeId,
    #[serde(default)]
    pub color: RopeColor,
    pub pins: Vec<PinId>,
    /// Higher draws on top at a crossing.
    #[serde(default)]
    pub render_priority: i32,
    #[serde(default)]
    render_path: Vec<Point3>,
}

impl Rope {
    pub fn new(id: RopeId, color: RopeColor, pins: Vec<PinId>, render_priority: i32) -> Self {
        Self {
            id,
            color,
            pins,
            render_priority,
            render_path: Vec::new(),
        }
    }

    pub fn start_pin(&self) -> Option<PinId> {
        self.pins.first().copied()
    }

    pub fn end_pin(&self) -> Option<PinId> {
        if self.pins.len() > 1 {
            self.pins.last().copied()
        } else {
            None
        }
    }

    /// Ordered 3D points for tube meshing, weaves included.
    pub fn render_path(&self) -> &[Point3] {
        &self.render_path
    }

    pub(crate) fn set_render_path(&mut self, path: Vec<Point3>) {
        self.render_path = path;
    }
}

/// One crossing between two distinct ropes. Rebuilt from scratch on every recompute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intersection {
    pub rope_a: RopeId,
    pub rope_b: RopeId,
    pub point: Point2,
    /// The rope drawn over the other at this crossing.
    pub top: RopeId,
}

impl Intersection {
    pub fn bottom(&self) -> RopeId {
        if self.top == self.rope_a {
            self.rope_b
        } else {
            self.rope_a
        }
    }

    pub fn involves(&self, rope: RopeId) -> bool {
        self.rope_a == rope || self.rope_b == rope
    }
}
