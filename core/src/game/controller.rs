use super::events::{EventBus, PuzzleEvent};
use crate::config::PuzzleConfig;
use crate::geometry::Point2;
use crate::level::{LevelDef, LevelError};
use crate::logic::{all_intersections, preview_intersections};
use crate::model::{EntityStore, Intersection, Pin, PinId, Rope, RopeId, Slot, SlotId, SnapError};
use crate::rendering::PathWeaver;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Receiver;
use tracing::{debug, info, warn};

/// Everything a renderer needs for one frame of the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuzzleSnapshot {
    pub slots: Vec<Slot>,
    pub pins: Vec<Pin>,
    pub ropes: Vec<Rope>,
    pub intersections: Vec<Intersection>,
    pub crossing_count: usize,
    pub solved: bool,
}

/// Owner of the loaded level and its crossing set.
///
/// All mutation of puzzle truth goes through here. Every change that can
/// move a pin ends in [`PuzzleController::recalculate_intersections`], which
/// replaces the crossing list, re-weaves every rope and fires notifications.
pub struct PuzzleController {
    store: EntityStore,
    intersections: Vec<Intersection>,
    weaver: PathWeaver,
    config: PuzzleConfig,
    events: EventBus,
    /// Bumped by every successful level load
    generation: u64,
}

impl PuzzleController {
    pub fn new(config: PuzzleConfig) -> Self {
        let weaver = PathWeaver::from_config(&config.weave);
        Self::with_weaver(config, weaver)
    }

    pub fn with_weaver(config: PuzzleConfig, weaver: PathWeaver) -> Self {
        Self {
            store: EntityStore::new(),
            intersections: Vec::new(),
            weaver,
            config,
            events: EventBus::new(),
            generation: 0,
        }
    }

    pub fn config(&self) -> &PuzzleConfig {
        &self.config
    }

    pub fn subscribe(&mut self) -> Receiver<PuzzleEvent> {
        self.events.subscribe()
    }

    /// Identifies the loaded level. Ids saved against one level must not be
    /// applied after this changes.
    pub fn level_generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn emit(&mut self, event: PuzzleEvent) {
        self.events.emit(event);
    }

    /// Replace the whole board. On error the current level is kept as is.
    pub fn set_level(&mut self, slots: Vec<Slot>, pins: Vec<Pin>, ropes: Vec<Rope>) -> Result<(), LevelError> {
        self.store = EntityStore::from_parts(slots, pins, ropes)?;
        self.generation += 1;
        self.recalculate_intersections();

        info!(
            "Level data set: {} slots, {} pins, {} ropes",
            self.store.slots().len(),
            self.store.pins().len(),
            self.store.ropes().len()
        );
        Ok(())
    }

    pub fn load_level(&mut self, level: &LevelDef) -> Result<(), LevelError> {
        let data = level.build()?;
        self.set_level(data.slots, data.pins, data.ropes)
    }

    /// Recompute every crossing from scratch and rebuild all render paths.
    ///
    /// The count notification is edge-triggered against the previous total;
    /// the solved notification fires on every recompute that finds no crossing.
    pub fn recalculate_intersections(&mut self) {
        let previous = self.intersections.len();

        self.intersections = all_intersections(&self.store);
        self.weaver.weave_all(&mut self.store, &self.intersections);
        self.emit(PuzzleEvent::RenderPathsUpdated);

        let count = self.intersections.len();
        if count != previous {
            info!("Intersection count changed: {} -> {}", previous, count);
            self.emit(PuzzleEvent::CrossingCountChanged { count });
        }

        if count == 0 {
            info!("Level cleared");
            self.emit(PuzzleEvent::PuzzleSolved);
        }
    }

    pub fn find_nearest_empty_slot(&self, position: Point2, max_radius: f64) -> Option<&Slot> {
        self.store.nearest_empty_slot(position, max_radius)
    }

    /// Commit `pin` into the empty slot `slot`.
    pub fn try_snap(&mut self, pin: PinId, slot: SlotId) -> Result<(), SnapError> {
        if let Err(e) = self.store.relocate_pin(pin, slot) {
            warn!("Snap rejected: {}", e);
            return Err(e);
        }

        self.recalculate_intersections();
        self.emit(PuzzleEvent::PinSnapped { pin, slot });
        info!("{} snapped to {}", pin, slot);
        Ok(())
    }

    /// Boolean form of [`Self::try_snap`]. False means nothing changed.
    pub fn snap(&mut self, pin: PinId, slot: SlotId) -> bool {
        self.try_snap(pin, slot).is_ok()
    }

    /// Return `pin` to `origin`, dropping its preview position, then recompute.
    pub fn rollback_pin(&mut self, pin: PinId, origin: SlotId) -> Result<(), SnapError> {
        if let Err(e) = self.store.restore_pin(pin, origin) {
            warn!("Rollback of {} to {} failed: {}", pin, origin, e);
            return Err(e);
        }

        self.recalculate_intersections();
        info!("Rollback of {} to {}", pin, origin);
        Ok(())
    }

    /// Move `pin` to a hypothetical position and re-weave only its rope.
    ///
    /// The rope is woven against the committed crossings of every other pair
    /// plus its own live crossings. No count or solved notification fires;
    /// those wait for the resolving recompute.
    pub fn preview_pin(&mut self, pin: PinId, position: Point2) -> bool {
        if !self.store.set_pin_preview(pin, position) {
            debug!("Preview ignored for unknown {}", pin);
            return false;
        }

        let Some(rope) = self.store.rope_of_pin(pin) else {
            return true;
        };
        let rope_id = rope.id;

        let mut live: Vec<Intersection> = self
            .intersections
            .iter()
            .filter(|hit| !hit.involves(rope_id))
            .copied()
            .collect();
        live.extend(preview_intersections(&self.store, pin, position));

        let path = self.weaver.weave_rope(&self.store, rope, &live);
        if let Some(rope) = self.store.rope_mut(rope_id) {
            rope.set_render_path(path);
        }

        self.emit(PuzzleEvent::RenderPathsUpdated);
        true
    }

    /// Crossings the rope owning `pin` would have at `position`.
    pub fn preview_crossings(&self, pin: PinId, position: Point2) -> Vec<Intersection> {
        preview_intersections(&self.store, pin, position)
    }

    /// Set a rope's render priority, returning the previous value.
    pub(crate) fn set_rope_priority(&mut self, rope: RopeId, priority: i32) -> Option<i32> {
        let rope = self.store.rope_mut(rope)?;
        Some(std::mem::replace(&mut rope.render_priority, priority))
    }

    pub(crate) fn set_pin_scale(&mut self, pin: PinId, scale: f64) -> bool {
        self.store.set_pin_scale(pin, scale)
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn slots(&self) -> &[Slot] {
        self.store.slots()
    }

    pub fn pins(&self) -> &[Pin] {
        self.store.pins()
    }

    pub fn ropes(&self) -> &[Rope] {
        self.store.ropes()
    }

    pub fn slot(&self, id: SlotId) -> Option<&Slot> {
        self.store.slot(id)
    }

    pub fn pin(&self, id: PinId) -> Option<&Pin> {
        self.store.pin(id)
    }

    pub fn rope(&self, id: RopeId) -> Option<&Rope> {
        self.store.rope(id)
    }

    pub fn intersections(&self) -> &[Intersection] {
        &self.intersections
    }

    pub fn crossing_count(&self) -> usize {
        self.intersections.len()
    }

    pub fn is_solved(&self) -> bool {
        self.intersections.is_empty()
    }

    pub fn snapshot(&self) -> PuzzleSnapshot {
        PuzzleSnapshot {
            slots: self.store.slots().to_vec(),
            pins: self.store.pins().to_vec(),
            ropes: self.store.ropes().to_vec(),
            intersections: self.intersections.clone(),
            crossing_count: self.crossing_count(),
            solved: self.is_solved(),
        }
    }
}

impl Default for PuzzleController {
    fn default() -> Self {
        Self::new(PuzzleConfig::default())
    }
}
