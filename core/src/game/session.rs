use super::controller::{PuzzleController, PuzzleSnapshot};
use super::drag::{MoveController, MoveOutcome, MovePhase};
use super::events::PuzzleEvent;
use crate::config::PuzzleConfig;
use crate::geometry::Point2;
use crate::level::{LevelDef, LevelError};
use crate::model::{Intersection, Pin, PinId, Rope, Slot, SlotId};
use std::sync::mpsc::Receiver;
use tracing::debug;

/// One puzzle and the drag state machine driving it, behind a single handle.
pub struct PuzzleSession {
    puzzle: PuzzleController,
    mover: MoveController,
}

impl PuzzleSession {
    pub fn new(config: PuzzleConfig) -> Self {
        Self::from_controller(PuzzleController::new(config))
    }

    pub fn from_controller(puzzle: PuzzleController) -> Self {
        Self {
            puzzle,
            mover: MoveController::new(),
        }
    }

    pub fn controller(&self) -> &PuzzleController {
        &self.puzzle
    }

    pub fn subscribe(&mut self) -> Receiver<PuzzleEvent> {
        self.puzzle.subscribe()
    }

    /// Replace the board. A drag in progress is dropped without a rollback
    /// since its pin no longer exists.
    pub fn set_level(&mut self, slots: Vec<Slot>, pins: Vec<Pin>, ropes: Vec<Rope>) -> Result<(), LevelError> {
        self.puzzle.set_level(slots, pins, ropes)?;
        self.reset_mover();
        Ok(())
    }

    pub fn load_level(&mut self, level: &LevelDef) -> Result<(), LevelError> {
        self.puzzle.load_level(level)?;
        self.reset_mover();
        Ok(())
    }

    fn reset_mover(&mut self) {
        if self.mover.is_dragging() {
            debug!("Discarding drag of {:?} on level change", self.mover.dragged_pin());
        }
        self.mover = MoveController::new();
    }

    pub fn begin_move(&mut self, pin: PinId, position: Point2) -> bool {
        self.mover.begin_move(&mut self.puzzle, pin, position)
    }

    pub fn update_move(&mut self, position: Point2) {
        self.mover.update_move(&mut self.puzzle, position)
    }

    pub fn end_move(&mut self, position: Point2) -> Option<MoveOutcome> {
        self.mover.end_move(&mut self.puzzle, position)
    }

    pub fn cancel_move(&mut self) -> Option<MoveOutcome> {
        self.mover.cancel_move(&mut self.puzzle)
    }

    pub fn phase(&self) -> MovePhase {
        self.mover.phase()
    }

    pub fn find_nearest_empty_slot(&self, position: Point2, max_radius: f64) -> Option<&Slot> {
        self.puzzle.find_nearest_empty_slot(position, max_radius)
    }

    /// Direct commit. Refused while a drag is running so the drag's saved
    /// origin stays valid.
    pub fn snap(&mut self, pin: PinId, slot: SlotId) -> bool {
        if self.mover.is_dragging() {
            debug!("Ignoring snap of {} while a drag is active", pin);
            return false;
        }
        self.puzzle.snap(pin, slot)
    }

    pub fn slots(&self) -> &[Slot] {
        self.puzzle.slots()
    }

    pub fn pins(&self) -> &[Pin] {
        self.puzzle.pins()
    }

    pub fn ropes(&self) -> &[Rope] {
        self.puzzle.ropes()
    }

    pub fn intersections(&self) -> &[Intersection] {
        self.puzzle.intersections()
    }

    pub fn crossing_count(&self) -> usize {
        self.puzzle.crossing_count()
    }

    pub fn is_solved(&self) -> bool {
        self.puzzle.is_solved()
    }

    pub fn snapshot(&self) -> PuzzleSnapshot {
        self.puzzle.snapshot()
    }
}

impl Default for PuzzleSession {
    fn default() -> Self {
        Self::new(PuzzleConfig::default())
    }
}
