#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state management for twenty48.
//!
//! The world owns the sixteen cells, the completion barrier that gates turn
//! completion, and the session score. Every mutation flows through [`apply`],
//! which records its observable consequences as [`Event`] values. Shifts are
//! planned from a single snapshot; the resulting cell mutations are deferred
//! until the presentation surface reports each transition as complete.

mod barrier;
mod cell;
mod shift;

use std::collections::BTreeMap;

use tracing::{debug, info, trace, warn};
use twenty48_core::{
    is_tile_value, BoardSnapshot, CellIndex, Command, Direction, Event, ShiftRejection,
    SpawnRejection, Transition, TransitionId, BOARD_SIDE, CELL_COUNT, INITIAL_TILES,
};

pub use barrier::CompletionBarrier;

use cell::Cell;
use shift::{TransferEffect, TransferRequest};

/// Represents the authoritative board, barrier and score of one session.
#[derive(Debug)]
pub struct World {
    cells: [Cell; CELL_COUNT],
    barrier: CompletionBarrier,
    pending: BTreeMap<TransitionId, PendingTransition>,
    next_transition_id: u64,
    turn: Option<Turn>,
    spawn_allowance: usize,
    score: u32,
    turn_score: u32,
    max_value: u32,
    game_over: bool,
}

impl World {
    /// Creates an empty board that accepts no spawns until a restart.
    #[must_use]
    pub fn new() -> Self {
        Self::from_snapshot(BoardSnapshot::default())
    }

    /// Creates a world whose cells hold the provided values.
    ///
    /// The game-over flag is derived from the board immediately, and the
    /// maximum value starts at the largest tile present.
    ///
    /// # Panics
    ///
    /// Panics when a value is neither zero nor a power of two of at least two.
    #[must_use]
    pub fn from_snapshot(snapshot: BoardSnapshot) -> Self {
        let mut cells = [Cell::new(CellIndex::at(0, 0), 0); CELL_COUNT];
        for cell in CellIndex::all() {
            let value = snapshot.value(cell);
            assert!(
                is_tile_value(value),
                "cell {cell} holds {value}, which is not a tile value"
            );
            cells[cell.get()] = Cell::new(cell, value);
        }

        Self {
            cells,
            barrier: CompletionBarrier::new(),
            pending: BTreeMap::new(),
            next_transition_id: 0,
            turn: None,
            spawn_allowance: 0,
            score: 0,
            turn_score: 0,
            max_value: snapshot.max_value(),
            game_over: is_terminal(&snapshot),
        }
    }

    fn snapshot(&self) -> BoardSnapshot {
        let mut values = [0; CELL_COUNT];
        for cell in &self.cells {
            values[cell.index().get()] = cell.value();
        }
        BoardSnapshot::from_values(values)
    }

    fn set_value(&mut self, cell: CellIndex, value: u32, out_events: &mut Vec<Event>) {
        if self.cells[cell.get()].set_value(value) {
            out_events.push(Event::ValueChanged { cell, value });
        }
    }

    fn begin_turn(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        let rejection = if self.game_over {
            Some(ShiftRejection::GameOver)
        } else if !self.barrier.is_zero() {
            Some(ShiftRejection::TurnInProgress)
        } else {
            None
        };
        if let Some(reason) = rejection {
            debug!(%direction, ?reason, "shift rejected");
            out_events.push(Event::ShiftRejected { direction, reason });
            return;
        }

        // Hold the barrier open so transitions completing during the shift
        // cannot settle the turn early.
        self.barrier.increment();
        let (changed, merges) = self.shift(direction, out_events);
        debug!(%direction, changed, merges, "shift resolved");
        out_events.push(Event::ShiftResolved {
            direction,
            changed,
            merges,
        });

        self.turn = Some(Turn { changed });
        if self.barrier.decrement() {
            self.settle(out_events);
        }
    }

    fn shift(&mut self, direction: Direction, out_events: &mut Vec<Event>) -> (bool, u32) {
        let snapshot = self.snapshot();
        let plan = shift::plan(&snapshot, direction);

        let mut changed = false;
        for (request, effect) in plan.requests.iter().zip(plan.effects()) {
            changed |= self.request_transfer(*request, effect, out_events);
        }

        self.turn_score += plan.score;
        self.max_value = self.max_value.max(plan.max_merged);
        (changed, plan.merges)
    }

    fn request_transfer(
        &mut self,
        request: TransferRequest,
        effect: TransferEffect,
        out_events: &mut Vec<Event>,
    ) -> bool {
        let Some(kind) = self.cells[request.from.get()].request_transfer(request.to, request.value)
        else {
            return false;
        };

        let transition = Transition {
            id: TransitionId::new(self.next_transition_id),
            kind,
            from: request.from,
            to: request.to,
            value: request.value,
        };
        self.next_transition_id += 1;

        self.barrier.increment();
        let _ = self
            .pending
            .insert(transition.id, PendingTransition { transition, effect });
        trace!(id = transition.id.get(), ?kind, from = %request.from, to = %request.to, "transition started");
        out_events.push(Event::TransitionStarted { transition });
        true
    }

    fn complete_transition(&mut self, id: TransitionId, out_events: &mut Vec<Event>) {
        let Some(PendingTransition { transition, effect }) = self.pending.remove(&id) else {
            warn!(id = id.get(), "ignoring completion for unknown transition");
            return;
        };

        trace!(id = id.get(), "transition completed");
        if effect.write_target {
            self.set_value(transition.to, transition.value, out_events);
        }
        if effect.clear_source {
            self.set_value(transition.from, 0, out_events);
        }

        if self.barrier.decrement() {
            self.settle(out_events);
        }
    }

    fn settle(&mut self, out_events: &mut Vec<Event>) {
        let Some(turn) = self.turn.take() else {
            return;
        };

        self.spawn_allowance = usize::from(turn.changed);

        let turn_score = std::mem::take(&mut self.turn_score);
        if turn_score > 0 {
            self.score += turn_score;
            out_events.push(Event::ScoreChanged { score: self.score });
        }

        debug!(changed = turn.changed, turn_score, score = self.score, "turn completed");
        out_events.push(Event::TurnCompleted {
            changed: turn.changed,
            turn_score,
        });
        self.check_game_over(out_events);
    }

    fn spawn_tile(&mut self, cell: CellIndex, value: u32, out_events: &mut Vec<Event>) {
        let rejection = if self.spawn_allowance == 0 {
            Some(SpawnRejection::NothingChanged)
        } else if value == 0 || !is_tile_value(value) {
            Some(SpawnRejection::InvalidValue)
        } else if self.cells[cell.get()].value() != 0 {
            Some(SpawnRejection::CellOccupied)
        } else {
            None
        };
        if let Some(reason) = rejection {
            debug!(%cell, value, ?reason, "spawn rejected");
            out_events.push(Event::SpawnRejected { cell, reason });
            return;
        }

        self.spawn_allowance -= 1;
        self.set_value(cell, value, out_events);
        self.max_value = self.max_value.max(value);
        debug!(%cell, value, "tile spawned");
        out_events.push(Event::TileSpawned { cell, value });
        self.check_game_over(out_events);
    }

    fn check_game_over(&mut self, out_events: &mut Vec<Event>) {
        if self.game_over || !is_terminal(&self.snapshot()) {
            return;
        }

        self.game_over = true;
        info!(score = self.score, max_value = self.max_value, "game over");
        out_events.push(Event::GameOver {
            score: self.score,
            max_value: self.max_value,
        });
    }

    fn restart(&mut self, out_events: &mut Vec<Event>) {
        for cell in CellIndex::all() {
            self.set_value(cell, 0, out_events);
        }

        if !self.pending.is_empty() {
            warn!(
                pending = self.pending.len(),
                "restart discarded transitions still in flight"
            );
        }
        self.pending.clear();
        self.barrier.reset();
        self.turn = None;

        if self.score != 0 {
            self.score = 0;
            out_events.push(Event::ScoreChanged { score: 0 });
        }
        self.turn_score = 0;
        self.max_value = 0;
        self.game_over = false;
        self.spawn_allowance = INITIAL_TILES;

        info!("board reset");
        out_events.push(Event::BoardReset);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Shift { direction } => world.begin_turn(direction, out_events),
        Command::CompleteTransition { id } => world.complete_transition(id, out_events),
        Command::SpawnTile { cell, value } => world.spawn_tile(cell, value, out_events),
        Command::Restart => world.restart(out_events),
    }
}

/// Reports whether the board can no longer change: no empty cell and no
/// equal pair among the twelve horizontal and twelve vertical neighbours.
#[must_use]
pub fn is_terminal(snapshot: &BoardSnapshot) -> bool {
    if snapshot.values().iter().any(|value| *value == 0) {
        return false;
    }

    for row in 0..BOARD_SIDE {
        for column in 0..BOARD_SIDE - 1 {
            let left = snapshot.value(CellIndex::at(row, column));
            let right = snapshot.value(CellIndex::at(row, column + 1));
            if left == right {
                return false;
            }
        }
    }

    for column in 0..BOARD_SIDE {
        for row in 0..BOARD_SIDE - 1 {
            let upper = snapshot.value(CellIndex::at(row, column));
            let lower = snapshot.value(CellIndex::at(row + 1, column));
            if upper == lower {
                return false;
            }
        }
    }

    true
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use twenty48_core::{BoardSnapshot, CellIndex, Direction, Transition};

    use super::{shift, CompletionBarrier, World};

    /// Captures the current value of every cell.
    #[must_use]
    pub fn snapshot(world: &World) -> BoardSnapshot {
        world.snapshot()
    }

    /// Value currently stored in the provided cell.
    #[must_use]
    pub fn value(world: &World, cell: CellIndex) -> u32 {
        world.cells[cell.get()].value()
    }

    /// Empty cells in board order.
    #[must_use]
    pub fn empty_cells(world: &World) -> Vec<CellIndex> {
        world.snapshot().empty_cells()
    }

    /// Total committed score.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Score accumulated by the current turn and not yet committed.
    #[must_use]
    pub fn turn_score(world: &World) -> u32 {
        world.turn_score
    }

    /// Largest tile value reached since the last restart.
    #[must_use]
    pub fn max_value(world: &World) -> u32 {
        world.max_value
    }

    /// Reports whether the board reached its terminal state.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.game_over
    }

    /// Reports whether every transition completed, so new input is accepted.
    #[must_use]
    pub fn is_settled(world: &World) -> bool {
        world.barrier.is_zero()
    }

    /// Provides read-only access to the completion barrier.
    #[must_use]
    pub fn barrier(world: &World) -> &CompletionBarrier {
        &world.barrier
    }

    /// Transitions awaiting completion, ordered by identifier.
    #[must_use]
    pub fn pending_transitions(world: &World) -> Vec<Transition> {
        world
            .pending
            .values()
            .map(|pending| pending.transition)
            .collect()
    }

    /// Number of spawns the world currently accepts.
    #[must_use]
    pub fn spawn_allowance(world: &World) -> usize {
        world.spawn_allowance
    }

    /// Plans a shift without mutating the world.
    #[must_use]
    pub fn preview_shift(world: &World, direction: Direction) -> ShiftPreview {
        let snapshot = world.snapshot();
        let plan = shift::plan(&snapshot, direction);
        ShiftPreview {
            changed: plan.changes(&snapshot),
            merges: plan.merges,
            score: plan.score,
            board: plan.settled(&snapshot),
        }
    }

    /// Outcome of a shift planned against the current board.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ShiftPreview {
        /// Whether the shift would start any transition.
        pub changed: bool,
        /// Number of merges the shift would perform.
        pub merges: u32,
        /// Score the shift would add on completion.
        pub score: u32,
        /// Board values once every transition completed, before any spawn.
        pub board: BoardSnapshot,
    }
}

#[derive(Clone, Copy, Debug)]
struct Turn {
    changed: bool,
}

#[derive(Clone, Copy, Debug)]
struct PendingTransition {
    transition: Transition,
    effect: TransferEffect,
}
