use super::{Pin, PinId, Rope, RopeId, Slot, SlotId};
use crate::geometry::utils_2d::distance;
use crate::geometry::Point2;
use crate::level::LevelError;
use std::collections::HashMap;
use std::hash::Hash;
use thiserror::Error;

/// Reasons a pin cannot be moved into a slot.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SnapError {
    #[error("Unknown pin: {0}")]
    UnknownPin(PinId),

    #[error("Unknown slot: {0}")]
    UnknownSlot(SlotId),

    #[error("{slot} is occupied by {occupant}")]
    SlotOccupied { slot: SlotId, occupant: PinId },
}

/// Owner of every slot, pin and rope of the loaded level.
///
/// Listings keep the order the level supplied; lookups go through id maps.
/// Slot occupancy and pin placement are only changed together, here.
#[derive(Debug, Default, Clone)]
pub struct EntityStore {
    slots: Vec<Slot>,
    pins: Vec<Pin>,
    ropes: Vec<Rope>,
    slot_index: HashMap<SlotId, usize>,
    pin_index: HashMap<PinId, usize>,
    rope_index: HashMap<RopeId, usize>,
}

fn index_by<T, K: Hash + Eq + Copy>(items: &[T], key: impl Fn(&T) -> K) -> Result<HashMap<K, usize>, K> {
    let mut index = HashMap::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let k = key(item);
        if index.insert(k, i).is_some() {
            return Err(k);
        }
    }
    Ok(index)
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from level data.
    ///
    /// Occupancy is derived from each pin's slot reference, so whatever the
    /// incoming slots claim is discarded. Pins are synced onto their slots.
    /// Ropes may reference pins that do not exist; such ropes simply never cross.
    pub fn from_parts(mut slots: Vec<Slot>, mut pins: Vec<Pin>, ropes: Vec<Rope>) -> Result<Self, LevelError> {
        let slot_index = index_by(&slots, |s| s.id).map_err(LevelError::DuplicateSlot)?;
        let pin_index = index_by(&pins, |p| p.id).map_err(LevelError::DuplicatePin)?;
        let rope_index = index_by(&ropes, |r| r.id).map_err(LevelError::DuplicateRope)?;

        for slot in &mut slots {
            slot.release();
        }

        for pin in &mut pins {
            let idx = *slot_index.get(&pin.slot()).ok_or(LevelError::UnknownSlot {
                pin: pin.id,
                slot: pin.slot(),
            })?;
            let slot = &mut slots[idx];
            if let Some(first) = slot.occupant() {
                return Err(LevelError::SlotDoubleBooked {
                    slot: slot.id,
                    first,
                    second: pin.id,
                });
            }
            slot.occupy(pin.id);
            pin.sync_from_slot(slot);
            pin.set_scale(1.0);
        }

        Ok(Self {
            slots,
            pins,
            ropes,
            slot_index,
            pin_index,
            rope_index,
        })
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    pub fn ropes(&self) -> &[Rope] {
        &self.ropes
    }

    pub fn slot(&self, id: SlotId) -> Option<&Slot> {
        self.slot_index.get(&id).map(|&i| &self.slots[i])
    }

    pub fn pin(&self, id: PinId) -> Option<&Pin> {
        self.pin_index.get(&id).map(|&i| &self.pins[i])
    }

    pub fn rope(&self, id: RopeId) -> Option<&Rope> {
        self.rope_index.get(&id).map(|&i| &self.ropes[i])
    }

    pub(crate) fn rope_mut(&mut self, id: RopeId) -> Option<&mut Rope> {
        self.rope_index.get(&id).map(|&i| &mut self.ropes[i])
    }

    pub(crate) fn ropes_mut(&mut self) -> &mut [Rope] {
        &mut self.ropes
    }

    fn pin_mut(&mut self, id: PinId) -> Option<&mut Pin> {
        self.pin_index.get(&id).map(|&i| &mut self.pins[i])
    }

    /// The rope a pin terminates, if both exist.
    pub fn rope_of_pin(&self, pin: PinId) -> Option<&Rope> {
        self.pin(pin).and_then(|p| self.rope(p.rope))
    }

    /// Logic positions of a rope's first and last pin.
    pub fn rope_endpoints(&self, rope: &Rope) -> Option<(Point2, Point2)> {
        let start = self.pin(rope.start_pin()?)?;
        let end = self.pin(rope.end_pin()?)?;
        Some((start.logic_position(), end.logic_position()))
    }

    /// Closest unoccupied slot within `max_radius` of `position`.
    /// On equal distance the slot listed first wins.
    pub fn nearest_empty_slot(&self, position: Point2, max_radius: f64) -> Option<&Slot> {
        let mut nearest = None;
        let mut min_dist = f64::MAX;

        for slot in self.slots.iter().filter(|s| s.is_empty()) {
            let d = distance(&position, &slot.position);
            if d <= max_radius && d < min_dist {
                min_dist = d;
                nearest = Some(slot);
            }
        }

        nearest
    }

    /// Move a pin into an empty slot, releasing the one it held.
    ///
    /// Every reference is validated before anything is written, so a failed
    /// call leaves the store untouched. Returns the slot the pin left.
    pub fn relocate_pin(&mut self, pin: PinId, target: SlotId) -> Result<SlotId, SnapError> {
        let pin_idx = *self.pin_index.get(&pin).ok_or(SnapError::UnknownPin(pin))?;
        let target_idx = *self.slot_index.get(&target).ok_or(SnapError::UnknownSlot(target))?;

        if let Some(occupant) = self.slots[target_idx].occupant() {
            return Err(SnapError::SlotOccupied { slot: target, occupant });
        }

        let previous = self.pins[pin_idx].slot();
        if let Some(&prev_idx) = self.slot_index.get(&previous) {
            if self.slots[prev_idx].occupant() == Some(pin) {
                self.slots[prev_idx].release();
            }
        }

        self.slots[target_idx].occupy(pin);
        let pin = &mut self.pins[pin_idx];
        pin.set_slot(target);
        pin.sync_from_slot(&self.slots[target_idx]);

        Ok(previous)
    }

    /// Put a pin back on `origin`, discarding any preview position.
    ///
    /// Normally the pin never left `origin` (previews do not touch occupancy),
    /// in which case only its positions are re-synced.
    pub fn restore_pin(&mut self, pin: PinId, origin: SlotId) -> Result<(), SnapError> {
        let current = self.pin(pin).ok_or(SnapError::UnknownPin(pin))?.slot();
        if current != origin {
            self.relocate_pin(pin, origin)?;
            return Ok(());
        }

        let slot_idx = *self.slot_index.get(&origin).ok_or(SnapError::UnknownSlot(origin))?;
        let pin_idx = self.pin_index[&pin];
        self.pins[pin_idx].sync_from_slot(&self.slots[slot_idx]);
        Ok(())
    }

    /// Move a pin's logic and render position without committing it to a slot.
    pub fn set_pin_preview(&mut self, pin: PinId, position: Point2) -> bool {
        match self.pin_mut(pin) {
            Some(p) => {
                p.set_preview_position(position);
                true
            }
            None => false,
        }
    }

    pub fn set_pin_scale(&mut self, pin: PinId, scale: f64) -> bool {
        match self.pin_mut(pin) {
            Some(p) => {
                p.set_scale(scale);
                true
            }
            None => false,
        }
    }

    /// Checks that slot occupants and pin slot references agree both ways.
    pub fn is_consistent(&self) -> bool {
        let slots_agree = self.slots.iter().all(|slot| match slot.occupant() {
            Some(pin) => self.pin(pin).map_or(false, |p| p.slot() == slot.id),
            None => true,
        });
        let pins_agree = self
            .pins
            .iter()
            .all(|pin| self.slot(pin.slot()).map_or(false, |s| s.occupant() == Some(pin.id)));

        slots_agree && pins_agree
    }
}
