#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn controller driving one twenty48 session.
//!
//! The controller is the single entry point for input. It routes commands
//! through the world, lets the spawning system answer the resulting events
//! within the same call, and forwards every observable change to a
//! [`Presentation`]. Completions reported by the presentation re-enter through
//! [`TurnController::complete_transition`].

use tracing::{debug, info};
use twenty48_core::{
    tile_rank, BoardSnapshot, CellIndex, Command, Direction, Event, ShiftRejection, Transition,
    TransitionId,
};
use twenty48_system_spawning::{Config, Spawning};
use twenty48_world::{self as world, query, World};

/// Surface that shows the board and animates transitions.
///
/// Every method defaults to doing nothing, so a headless session can use `()`.
/// An implementation that receives [`Presentation::transition_requested`] must
/// eventually report exactly one completion for that transition.
pub trait Presentation {
    /// A cell now holds `value` (zero when empty).
    fn value_changed(&mut self, _cell: CellIndex, _value: u32) {}

    /// A cell's colour rank changed along with its value.
    fn color_changed(&mut self, _cell: CellIndex, _rank: u8) {}

    /// A slide or fade should start playing.
    fn transition_requested(&mut self, _transition: Transition) {}

    /// Every transition of the current turn completed.
    fn turn_completed(&mut self, _changed: bool) {}

    /// The board reached its terminal state.
    fn game_over(&mut self, _score: u32) {}

    /// The committed score changed.
    fn score_changed(&mut self, _score: u32) {}

    /// The board was cleared; transitions still playing will be ignored.
    fn board_reset(&mut self) {}
}

impl Presentation for () {}

/// Result of feeding one direction into the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShiftOutcome {
    /// The input was ignored.
    Rejected(ShiftRejection),
    /// The shift was accepted but moved nothing.
    Unchanged,
    /// The shift started at least one transition.
    Changed,
}

/// Owns the world and spawning system of one session.
#[derive(Debug)]
pub struct TurnController<P> {
    world: World,
    spawning: Spawning,
    presentation: P,
    history: Vec<Direction>,
}

impl<P: Presentation> TurnController<P> {
    /// Creates a controller and deals the initial tiles.
    #[must_use]
    pub fn new(config: Config, presentation: P) -> Self {
        Self::with_spawning(Spawning::new(config), presentation)
    }

    /// Creates a controller around an existing spawning system and deals the
    /// initial tiles from it.
    #[must_use]
    pub fn with_spawning(spawning: Spawning, presentation: P) -> Self {
        let mut controller = Self {
            world: World::new(),
            spawning,
            presentation,
            history: Vec::new(),
        };
        controller.restart();
        controller
    }

    /// Feeds a direction into the session.
    ///
    /// Input is rejected while a previous turn is still animating and after
    /// the game ended.
    pub fn shift(&mut self, direction: Direction) -> ShiftOutcome {
        let events = self.dispatch(Command::Shift { direction });
        let outcome = events
            .iter()
            .find_map(|event| match event {
                Event::ShiftRejected { reason, .. } => Some(ShiftOutcome::Rejected(*reason)),
                Event::ShiftResolved { changed: true, .. } => Some(ShiftOutcome::Changed),
                Event::ShiftResolved { changed: false, .. } => Some(ShiftOutcome::Unchanged),
                _ => None,
            })
            .unwrap_or(ShiftOutcome::Unchanged);

        if !matches!(outcome, ShiftOutcome::Rejected(_)) {
            self.history.push(direction);
        }
        outcome
    }

    /// Reports that the presentation finished playing a transition.
    pub fn complete_transition(&mut self, id: TransitionId) {
        let _ = self.dispatch(Command::CompleteTransition { id });
    }

    /// Clears the board and deals fresh initial tiles.
    pub fn restart(&mut self) {
        self.history.clear();
        let _ = self.dispatch(Command::Restart);
    }

    /// Rewinds the random sequence and restarts, so replaying the recorded
    /// directions reproduces the previous game.
    pub fn rewind(&mut self) {
        info!("rewinding session for replay");
        self.spawning.sequence_mut().replay();
        self.restart();
    }

    /// Directions accepted since the last restart, in input order.
    #[must_use]
    pub fn history(&self) -> &[Direction] {
        &self.history
    }

    /// Current board values.
    #[must_use]
    pub fn snapshot(&self) -> BoardSnapshot {
        query::snapshot(&self.world)
    }

    /// Committed score.
    #[must_use]
    pub fn score(&self) -> u32 {
        query::score(&self.world)
    }

    /// Largest tile value reached.
    #[must_use]
    pub fn max_value(&self) -> u32 {
        query::max_value(&self.world)
    }

    /// Reports whether the game ended.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        query::is_game_over(&self.world)
    }

    /// Reports whether new input would be accepted by the barrier.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        query::is_settled(&self.world)
    }

    /// Read-only access to the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Spawning system and its random sequence.
    #[must_use]
    pub fn spawning(&self) -> &Spawning {
        &self.spawning
    }

    /// Presentation receiving session updates.
    #[must_use]
    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    /// Mutable access to the presentation, used to pull completions from it.
    pub fn presentation_mut(&mut self) -> &mut P {
        &mut self.presentation
    }

    /// Consumes the controller, returning its presentation.
    pub fn into_presentation(self) -> P {
        self.presentation
    }

    fn dispatch(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);

        let mut commands = Vec::new();
        self.spawning
            .handle(&events, &query::empty_cells(&self.world), &mut commands);
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }

        debug!(events = events.len(), "command dispatched");
        self.forward(&events);
        events
    }

    fn forward(&mut self, events: &[Event]) {
        for event in events {
            match *event {
                Event::ValueChanged { cell, value } => {
                    self.presentation.value_changed(cell, value);
                    self.presentation.color_changed(cell, tile_rank(value));
                }
                Event::TransitionStarted { transition } => {
                    self.presentation.transition_requested(transition);
                }
                Event::TurnCompleted { changed, .. } => self.presentation.turn_completed(changed),
                Event::ScoreChanged { score } => self.presentation.score_changed(score),
                Event::GameOver { score, .. } => self.presentation.game_over(score),
                Event::BoardReset => self.presentation.board_reset(),
                Event::ShiftResolved { .. }
                | Event::ShiftRejected { .. }
                | Event::TileSpawned { .. }
                | Event::SpawnRejected { .. } => {}
            }
        }
    }
}
