//! Notifications fired by the puzzle to renderers, HUDs and hosts.
//!
//! Subscribers receive a channel; dropping the receiver ends the subscription.

use crate::model::{PinId, SlotId};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{channel, Receiver, Sender};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PuzzleEvent {
    /// Fired only when the total differs from the previous recompute.
    CrossingCountChanged { count: usize },
    /// Fired after every full recompute that ends with zero crossings.
    PuzzleSolved,
    PinSnapped { pin: PinId, slot: SlotId },
    RenderPathsUpdated,
    SlotHighlightRequested { slot: SlotId },
    SlotHighlightCleared,
    DragStarted { pin: PinId },
    DragEnded { pin: PinId, snapped: bool },
}

#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<PuzzleEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<PuzzleEvent> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Deliver to every live subscriber, forgetting the ones that hung up.
    pub fn emit(&mut self, event: PuzzleEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
