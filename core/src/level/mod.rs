//! Level descriptions and the builders that turn them into store records.
//!
//! A level lists its slots and, per rope, the two slots the rope's pins start
//! in. Pins are generated from that pairing and numbered in rope order.

use crate::geometry::Point2;
use crate::model::{Pin, PinId, Rope, RopeColor, RopeId, Slot, SlotId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a level. Loading is all-or-nothing.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("Duplicate slot id: {0}")]
    DuplicateSlot(SlotId),

    #[error("Duplicate pin id: {0}")]
    DuplicatePin(PinId),

    #[error("Duplicate rope id: {0}")]
    DuplicateRope(RopeId),

    #[error("{pin} references unknown {slot}")]
    UnknownSlot { pin: PinId, slot: SlotId },

    #[error("{slot} is claimed by both {first} and {second}")]
    SlotDoubleBooked { slot: SlotId, first: PinId, second: PinId },

    #[error("{rope} starts in unknown {slot}")]
    RopeSlotMissing { rope: RopeId, slot: SlotId },

    #[error("Invalid grid: {rows}x{cols} with spacing {spacing}")]
    InvalidGrid { rows: u32, cols: u32, spacing: f64 },

    #[error("Failed to parse level: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Default rope colors, cycled by rope id.
pub const PALETTE: [RopeColor; 4] = [
    RopeColor::rgb(0.8, 0.2, 0.2),
    RopeColor::rgb(0.2, 0.5, 0.8),
    RopeColor::rgb(0.2, 0.8, 0.3),
    RopeColor::rgb(0.9, 0.7, 0.1),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotDef {
    pub id: SlotId,
    pub position: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RopeDef {
    pub id: RopeId,
    /// Slots the start and end pin are placed in.
    pub slots: [SlotId; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<RopeColor>,
    /// Defaults to the rope id, so later ropes draw on top.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LevelDef {
    #[serde(default)]
    pub name: String,
    pub slots: Vec<SlotDef>,
    #[serde(default)]
    pub ropes: Vec<RopeDef>,
}

/// Records ready for [`crate::game::PuzzleController::set_level`].
#[derive(Debug, Clone)]
pub struct LevelData {
    pub slots: Vec<Slot>,
    pub pins: Vec<Pin>,
    pub ropes: Vec<Rope>,
}

fn grid_slots(rows: u32, cols: u32, spacing: f64) -> Vec<SlotDef> {
    let offset_x = (cols as f64 - 1.0) * spacing * 0.5;
    let offset_y = (rows as f64 - 1.0) * spacing * 0.5;

    (0..rows)
        .flat_map(|row| (0..cols).map(move |col| (row, col)))
        .enumerate()
        .map(|(i, (row, col))| SlotDef {
            id: SlotId(i as u32),
            position: [
                col as f64 * spacing - offset_x,
                row as f64 * spacing - offset_y,
            ],
        })
        .collect()
}

impl LevelDef {
    /// A centered grid of slots, numbered row by row starting at the bottom left.
    pub fn grid(rows: u32, cols: u32, spacing: f64) -> Result<Self, LevelError> {
        if rows == 0 || cols == 0 || !(spacing > 0.0) {
            return Err(LevelError::InvalidGrid { rows, cols, spacing });
        }

        Ok(Self {
            name: format!("grid {}x{}", rows, cols),
            slots: grid_slots(rows, cols, spacing),
            ropes: Vec::new(),
        })
    }

    /// Add a rope whose pins start in slots `a` and `b`.
    pub fn with_rope(mut self, id: u32, a: u32, b: u32) -> Self {
        self.ropes.push(RopeDef {
            id: RopeId(id),
            slots: [SlotId(a), SlotId(b)],
            color: None,
            priority: None,
        });
        self
    }

    /// 3x3 board with two ropes laid along the diagonals, crossing once in the middle.
    pub fn crossing_demo() -> Self {
        Self {
            name: "crossing demo".to_string(),
            slots: grid_slots(3, 3, 2.0),
            ropes: Vec::new(),
        }
        .with_rope(0, 0, 8)
        .with_rope(1, 6, 2)
    }

    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, LevelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Generate slots, pins and ropes. Occupancy is established when the
    /// records are handed to the store.
    pub fn build(&self) -> Result<LevelData, LevelError> {
        let slots: Vec<Slot> = self
            .slots
            .iter()
            .map(|def| Slot::new(def.id, Point2::new(def.position[0], def.position[1])))
            .collect();

        let mut pins = Vec::with_capacity(self.ropes.len() * 2);
        let mut ropes = Vec::with_capacity(self.ropes.len());

        for def in &self.ropes {
            let mut pin_ids = Vec::with_capacity(2);
            for slot in def.slots {
                if !self.slots.iter().any(|s| s.id == slot) {
                    return Err(LevelError::RopeSlotMissing { rope: def.id, slot });
                }
                let id = PinId(pins.len() as u32);
                pins.push(Pin::new(id, slot, def.id));
                pin_ids.push(id);
            }

            let color = def
                .color
                .unwrap_or(PALETTE[def.id.0 as usize % PALETTE.len()]);
            let priority = def.priority.unwrap_or(def.id.0 as i32);
            ropes.push(Rope::new(def.id, color, pin_ids, priority));
        }

        Ok(LevelData { slots, pins, ropes })
    }
}
