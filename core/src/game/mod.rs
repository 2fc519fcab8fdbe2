//! Puzzle runtime: the controller owning puzzle truth, the drag state
//! machine, notifications and the cosmetic transitions handed to renderers.

pub mod controller;
pub mod drag;
pub mod events;
pub mod session;
pub mod transition;

pub use controller::{PuzzleController, PuzzleSnapshot};
pub use drag::{MoveController, MoveOutcome, MovePhase};
pub use events::{EventBus, PuzzleEvent};
pub use session::PuzzleSession;
pub use transition::{Easing, Transition, TransitionKind};

#[cfg(test)]
mod tests_controller;
