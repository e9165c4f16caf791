//! Headless presentation that completes transitions through a queue.

use tracing::{debug, info, trace};
use twenty48_core::{CellIndex, Transition};
use twenty48_session::Presentation;
use twenty48_system_transitions::CompletionQueue;

#[derive(Debug)]
pub(crate) struct TextPresentation {
    queue: CompletionQueue,
}

impl TextPresentation {
    pub(crate) fn new(queue: CompletionQueue) -> Self {
        Self { queue }
    }

    /// Next transition whose animation finished.
    pub(crate) fn release(&mut self) -> Option<Transition> {
        self.queue.release()
    }
}

impl Presentation for TextPresentation {
    fn value_changed(&mut self, cell: CellIndex, value: u32) {
        trace!(%cell, value, "cell value changed");
    }

    fn transition_requested(&mut self, transition: Transition) {
        self.queue.push(transition);
    }

    fn turn_completed(&mut self, changed: bool) {
        debug!(changed, pending = self.queue.len(), "turn completed");
    }

    fn game_over(&mut self, score: u32) {
        info!(score, "no moves left");
    }

    fn score_changed(&mut self, score: u32) {
        debug!(score, "score changed");
    }

    fn board_reset(&mut self) {
        self.queue.clear();
    }
}
