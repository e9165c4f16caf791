#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Automated play policy that picks the next shift direction.

use tracing::trace;
use twenty48_core::Direction;

/// Directions tried in order until one changes the board.
pub const DEFAULT_PRIORITY: [Direction; 4] = [
    Direction::Left,
    Direction::Up,
    Direction::Right,
    Direction::Down,
];

/// Pure system choosing shifts by fixed priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Autoplay {
    priority: [Direction; 4],
}

impl Autoplay {
    /// Creates a policy using [`DEFAULT_PRIORITY`].
    #[must_use]
    pub const fn new() -> Self {
        Self::with_priority(DEFAULT_PRIORITY)
    }

    /// Creates a policy trying directions in the provided order.
    #[must_use]
    pub const fn with_priority(priority: [Direction; 4]) -> Self {
        Self { priority }
    }

    /// Returns the first direction whose shift would change the board.
    ///
    /// `changes` reports whether shifting in a direction would start any
    /// transition. Nothing is chosen once the game is over.
    pub fn choose<F>(&self, game_over: bool, changes: F) -> Option<Direction>
    where
        F: Fn(Direction) -> bool,
    {
        if game_over {
            return None;
        }

        let choice = self
            .priority
            .iter()
            .copied()
            .find(|direction| changes(*direction));
        trace!(?choice, "autoplay decision");
        choice
    }
}

impl Default for Autoplay {
    fn default() -> Self {
        Self::new()
    }
}
