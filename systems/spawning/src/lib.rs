#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting tile spawn commands.

mod random;

use tracing::debug;
use twenty48_core::{
    spawn_value_for_roll, CellIndex, Command, Event, StreamKey, INITIAL_TILES, PERCENT_RANGE,
};

pub use random::{RandomSequence, Recording};

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Config {
    rng_seed: Option<u64>,
}

impl Config {
    /// Creates a new configuration, drawing the seed from entropy when `None`.
    #[must_use]
    pub const fn new(rng_seed: Option<u64>) -> Self {
        Self { rng_seed }
    }

    /// Creates a configuration with a fixed seed.
    #[must_use]
    pub const fn seeded(rng_seed: u64) -> Self {
        Self::new(Some(rng_seed))
    }

    /// Seed requested by the configuration, if any.
    #[must_use]
    pub const fn rng_seed(&self) -> Option<u64> {
        self.rng_seed
    }
}

/// Pure system that answers settled turns and restarts with spawn commands.
#[derive(Debug)]
pub struct Spawning {
    sequence: RandomSequence,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_sequence(RandomSequence::new(config))
    }

    /// Creates a spawning system drawing from an existing sequence.
    #[must_use]
    pub fn with_sequence(sequence: RandomSequence) -> Self {
        Self { sequence }
    }

    /// Random sequence backing every spawn decision.
    #[must_use]
    pub fn sequence(&self) -> &RandomSequence {
        &self.sequence
    }

    /// Mutable access to the random sequence, used to rewind it for replay.
    pub fn sequence_mut(&mut self) -> &mut RandomSequence {
        &mut self.sequence
    }

    /// Consumes events and the current empty cells to emit spawn commands.
    ///
    /// A changed turn asks for one tile and a board reset for the initial
    /// tiles. Cells chosen within one call are removed from the candidates,
    /// so several spawns never target the same cell. Nothing is drawn when no
    /// empty cell remains.
    pub fn handle(&mut self, events: &[Event], empty_cells: &[CellIndex], out: &mut Vec<Command>) {
        let requested: usize = events
            .iter()
            .map(|event| match event {
                Event::TurnCompleted { changed: true, .. } => 1,
                Event::BoardReset => INITIAL_TILES,
                _ => 0,
            })
            .sum();
        if requested == 0 {
            return;
        }

        let mut candidates = empty_cells.to_vec();
        for _ in 0..requested {
            if candidates.is_empty() {
                debug!("no empty cell left to spawn into");
                break;
            }

            let (cell, value) = self.draw_spawn(&mut candidates);
            out.push(Command::SpawnTile { cell, value });
        }
    }

    fn draw_spawn(&mut self, candidates: &mut Vec<CellIndex>) -> (CellIndex, u32) {
        debug_assert!(!candidates.is_empty(), "draw_spawn requires candidates");
        let count = u32::try_from(candidates.len()).unwrap_or(u32::MAX);
        let index = self.sequence.next(count, StreamKey::Cell) as usize;
        let cell = candidates.remove(index);

        let roll = self.sequence.next(PERCENT_RANGE, StreamKey::Value);
        let value = spawn_value_for_roll(roll);
        debug!(%cell, value, roll, "spawn drawn");
        (cell, value)
    }
}
