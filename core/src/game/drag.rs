use super::controller::PuzzleController;
use super::events::PuzzleEvent;
use super::transition::{Easing, Transition};
use crate::geometry::{Point2, Point3};
use crate::model::{PinId, RopeId, SlotId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovePhase {
    Idle,
    Dragging,
}

/// What was captured when the pin was picked up, so the drag can be undone.
#[derive(Debug, Clone, PartialEq)]
struct DragSession {
    /// Level the ids below belong to
    generation: u64,
    pin: PinId,
    origin_slot: SlotId,
    /// Owning rope and the priority it had before being raised
    rope_priority: Option<(RopeId, i32)>,
    original_scale: f64,
    highlighted: Option<SlotId>,
    last_position: Point2,
}

/// How a drag ended. The store is already final; the transitions are cosmetic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MoveOutcome {
    Snapped {
        pin: PinId,
        slot: SlotId,
        transitions: Vec<Transition>,
    },
    RolledBack {
        pin: PinId,
        slot: SlotId,
        transitions: Vec<Transition>,
    },
}

impl MoveOutcome {
    pub fn pin(&self) -> PinId {
        match self {
            MoveOutcome::Snapped { pin, .. } | MoveOutcome::RolledBack { pin, .. } => *pin,
        }
    }

    /// Slot the pin rests in after the move.
    pub fn slot(&self) -> SlotId {
        match self {
            MoveOutcome::Snapped { slot, .. } | MoveOutcome::RolledBack { slot, .. } => *slot,
        }
    }

    pub fn transitions(&self) -> &[Transition] {
        match self {
            MoveOutcome::Snapped { transitions, .. } | MoveOutcome::RolledBack { transitions, .. } => transitions,
        }
    }

    pub fn is_snapped(&self) -> bool {
        matches!(self, MoveOutcome::Snapped { .. })
    }
}

/// Pick-up, drag and release of a single pin.
///
/// Every call runs to completion against the controller it is handed.
/// Calls that make no sense in the current phase are ignored.
#[derive(Debug, Default)]
pub struct MoveController {
    session: Option<DragSession>,
}

impl MoveController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> MovePhase {
        if self.session.is_some() {
            MovePhase::Dragging
        } else {
            MovePhase::Idle
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn dragged_pin(&self) -> Option<PinId> {
        self.session.as_ref().map(|s| s.pin)
    }

    /// Slot currently highlighted as the drop target, if any.
    pub fn highlighted_slot(&self) -> Option<SlotId> {
        self.session.as_ref().and_then(|s| s.highlighted)
    }

    /// Forget a drag started on a level that has since been replaced. Its
    /// pin, slot and rope ids mean nothing on the new board.
    fn drop_stale(&mut self, puzzle: &PuzzleController) {
        let generation = puzzle.level_generation();
        if let Some(stale) = self.session.as_ref().filter(|s| s.generation != generation) {
            debug!("Discarding drag of {} from a replaced level", stale.pin);
            self.session = None;
        }
    }

    /// Pick up `pin`. Raises its rope above every other and enlarges the pin.
    ///
    /// Returns false when a drag is already running or the pin is unknown.
    pub fn begin_move(&mut self, puzzle: &mut PuzzleController, pin: PinId, position: Point2) -> bool {
        self.drop_stale(puzzle);
        if let Some(active) = &self.session {
            debug!("Ignoring pick-up of {} while dragging {}", pin, active.pin);
            return false;
        }

        let Some((origin_slot, original_scale)) = puzzle.pin(pin).map(|p| (p.slot(), p.scale())) else {
            debug!("Ignoring pick-up of unknown {}", pin);
            return false;
        };

        let rope_priority = match puzzle.store().rope_of_pin(pin).map(|r| r.id) {
            Some(rope) => puzzle.set_rope_priority(rope, i32::MAX).map(|previous| (rope, previous)),
            None => None,
        };

        let drag_scale = puzzle.config().drag.drag_scale;
        puzzle.set_pin_scale(pin, original_scale * drag_scale);

        self.session = Some(DragSession {
            generation: puzzle.level_generation(),
            pin,
            origin_slot,
            rope_priority,
            original_scale,
            highlighted: None,
            last_position: position,
        });

        puzzle.emit(PuzzleEvent::DragStarted { pin });
        info!("Drag started: {} from {}", pin, origin_slot);
        true
    }

    /// Follow the pointer. The highlight notifications fire only when the
    /// candidate slot changes.
    pub fn update_move(&mut self, puzzle: &mut PuzzleController, position: Point2) {
        self.drop_stale(puzzle);
        let Some(session) = self.session.as_mut() else {
            debug!("Ignoring move update while idle");
            return;
        };

        session.last_position = position;
        puzzle.preview_pin(session.pin, position);

        let snap_radius = puzzle.config().drag.snap_radius;
        let candidate = puzzle.find_nearest_empty_slot(position, snap_radius).map(|s| s.id);
        if candidate == session.highlighted {
            return;
        }

        if session.highlighted.is_some() {
            puzzle.emit(PuzzleEvent::SlotHighlightCleared);
        }
        if let Some(slot) = candidate {
            puzzle.emit(PuzzleEvent::SlotHighlightRequested { slot });
        }
        session.highlighted = candidate;
    }

    /// Release the pin at `position`: snap into the nearest empty slot in
    /// range, or fall back to the slot it came from.
    pub fn end_move(&mut self, puzzle: &mut PuzzleController, position: Point2) -> Option<MoveOutcome> {
        self.drop_stale(puzzle);
        if self.session.is_none() {
            debug!("Ignoring release while idle");
            return None;
        }
        self.resolve(puzzle, position, true)
    }

    /// Abort the drag and return the pin to its origin regardless of where it is.
    pub fn cancel_move(&mut self, puzzle: &mut PuzzleController) -> Option<MoveOutcome> {
        self.drop_stale(puzzle);
        let position = self.session.as_ref()?.last_position;
        self.resolve(puzzle, position, false)
    }

    fn resolve(&mut self, puzzle: &mut PuzzleController, position: Point2, allow_snap: bool) -> Option<MoveOutcome> {
        let session = self.session.take()?;
        let pin = session.pin;

        if session.highlighted.is_some() {
            puzzle.emit(PuzzleEvent::SlotHighlightCleared);
        }

        let held_scale = puzzle.pin(pin).map_or(session.original_scale, |p| p.scale());
        puzzle.set_pin_scale(pin, session.original_scale);

        let depth = puzzle.pin(pin).map_or(0.0, |p| p.render_position().z);
        let from = Point3::new(position.x, position.y, depth);

        let target = if allow_snap {
            let snap_radius = puzzle.config().drag.snap_radius;
            puzzle.find_nearest_empty_slot(position, snap_radius).map(|s| s.id)
        } else {
            None
        };

        // A committed rope stays on top through its own recompute
        let snapped_to = target.filter(|&slot| puzzle.try_snap(pin, slot).is_ok());

        if let Some((rope, priority)) = session.rope_priority {
            puzzle.set_rope_priority(rope, priority);
        }

        // Rollback recomputes with the real priority
        if snapped_to.is_none() {
            if let Err(e) = puzzle.rollback_pin(pin, session.origin_slot) {
                warn!("Could not return {} to {}: {}", pin, session.origin_slot, e);
            }
        }

        let drag = puzzle.config().drag.clone();
        let to = puzzle.pin(pin).map_or(from, |p| p.render_position());
        let mut transitions = Vec::with_capacity(2);

        let outcome = match snapped_to {
            Some(slot) => {
                transitions.push(Transition::movement(pin, from, to, drag.snap_duration, Easing::OutBack));
                transitions.push(Transition::scale(pin, held_scale, session.original_scale, drag.scale_duration));
                MoveOutcome::Snapped { pin, slot, transitions }
            }
            None => {
                transitions.push(Transition::movement(
                    pin,
                    from,
                    to,
                    drag.rollback_duration,
                    Easing::OutElastic,
                ));
                transitions.push(Transition::scale(pin, held_scale, session.original_scale, drag.scale_duration));
                MoveOutcome::RolledBack {
                    pin,
                    slot: session.origin_slot,
                    transitions,
                }
            }
        };

        let snapped = outcome.is_snapped();
        puzzle.emit(PuzzleEvent::DragEnded { pin, snapped });
        info!("Drag ended: {} rests in {} (snapped: {})", pin, outcome.slot(), snapped);
        Some(outcome)
    }
}
