#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the twenty48 turn engine.
//!
//! This crate defines the message surface that connects drivers, the
//! authoritative world, and pure systems. Drivers submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! presentation surfaces to react to. Systems consume event streams, query
//! immutable snapshots, and respond exclusively with new command batches.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of cells along each edge of the square board.
pub const BOARD_SIDE: usize = 4;

/// Total number of cells stored on the board.
pub const CELL_COUNT: usize = BOARD_SIDE * BOARD_SIDE;

/// Percentage draws strictly below this threshold spawn a 4 instead of a 2.
pub const FOUR_TILE_PERCENT: u32 = 10;

/// Exclusive upper bound of the percentage draw used to select spawn values.
pub const PERCENT_RANGE: u32 = 100;

/// Number of tiles placed on a freshly reset board.
pub const INITIAL_TILES: usize = 2;

/// Cardinal directions a shift may push tiles toward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Tiles slide toward row zero.
    Up,
    /// Tiles slide toward the last row.
    Down,
    /// Tiles slide toward column zero.
    Left,
    /// Tiles slide toward the last column.
    Right,
}

impl Direction {
    /// Every direction in declaration order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Reports whether the direction operates on rows rather than columns.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// Reports whether a line must be reversed so traversal starts at the
    /// wall the tiles slide toward.
    #[must_use]
    pub const fn reverses_line(self) -> bool {
        matches!(self, Self::Right | Self::Down)
    }

    /// Lowercase name of the direction.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a direction cannot be parsed from text.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown direction `{0}`, expected up/down/left/right or u/d/l/r")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "up" | "u" => Ok(Self::Up),
            "down" | "d" => Ok(Self::Down),
            "left" | "l" => Ok(Self::Left),
            "right" | "r" => Ok(Self::Right),
            _ => Err(ParseDirectionError(value.to_owned())),
        }
    }
}

/// Position of a single board cell in row-major order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellIndex(u8);

impl CellIndex {
    /// Creates a cell index from its row-major position, if it lies on the board.
    #[must_use]
    pub const fn new(index: usize) -> Option<Self> {
        if index < CELL_COUNT {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    /// Creates a cell index from row and column coordinates.
    ///
    /// # Panics
    ///
    /// Panics when either coordinate lies outside the board.
    #[must_use]
    pub const fn at(row: usize, column: usize) -> Self {
        assert!(row < BOARD_SIDE && column < BOARD_SIDE, "cell outside board");
        Self((row * BOARD_SIDE + column) as u8)
    }

    /// Row-major position of the cell.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0 as usize
    }

    /// Zero-based row of the cell.
    #[must_use]
    pub const fn row(self) -> usize {
        self.get() / BOARD_SIDE
    }

    /// Zero-based column of the cell.
    #[must_use]
    pub const fn column(self) -> usize {
        self.get() % BOARD_SIDE
    }

    /// Iterates over every cell of the board in row-major order.
    pub fn all() -> impl Iterator<Item = CellIndex> {
        (0..CELL_COUNT as u8).map(CellIndex)
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row(), self.column())
    }
}

/// Unique identifier assigned to a started transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransitionId(u64);

impl TransitionId {
    /// Creates a new transition identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Visual flavour of a transition requested from the presentation surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionKind {
    /// The tile slides from its source cell to a different target cell.
    Move,
    /// The tile disappears in place, collapsing into its merge partner.
    Fade,
}

/// A cell transition awaiting its completion signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition {
    /// Identifier the presentation surface reports back on completion.
    pub id: TransitionId,
    /// Slide or fade.
    pub kind: TransitionKind,
    /// Cell the tile leaves.
    pub from: CellIndex,
    /// Cell that receives `value` once the transition completes.
    pub to: CellIndex,
    /// Value delivered to `to` on completion.
    pub value: u32,
}

/// Tag naming an independent stream of random draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StreamKey {
    /// Draws selecting which empty cell receives a spawned tile.
    Cell,
    /// Percentage draws selecting the spawned tile's value.
    Value,
}

impl StreamKey {
    /// Stable name of the stream.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cell => "Cell",
            Self::Value => "Value",
        }
    }
}

/// Reasons a shift request is ignored by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShiftRejection {
    /// Transitions from the previous turn have not completed yet.
    TurnInProgress,
    /// The board reached its terminal state.
    GameOver,
}

/// Reasons a spawn request is ignored by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnRejection {
    /// No settled turn or restart made room for a new tile.
    NothingChanged,
    /// The requested cell already holds a tile.
    CellOccupied,
    /// The requested value is not a power of two of at least two.
    InvalidValue,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Requests a turn that shifts every line toward the direction.
    Shift {
        /// Direction the tiles slide toward.
        direction: Direction,
    },
    /// Reports that the presentation surface finished a transition.
    CompleteTransition {
        /// Identifier of the finished transition.
        id: TransitionId,
    },
    /// Requests that a new tile be placed directly into an empty cell.
    SpawnTile {
        /// Empty cell that receives the tile.
        cell: CellIndex,
        /// Value of the spawned tile.
        value: u32,
    },
    /// Clears the board and resets score, maximum value and game over.
    Restart,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event {
    /// A shift was accepted and every line was planned.
    ShiftResolved {
        /// Direction of the shift.
        direction: Direction,
        /// Whether any transition was started.
        changed: bool,
        /// Number of merges decided by the shift.
        merges: u32,
    },
    /// A shift request was ignored.
    ShiftRejected {
        /// Direction of the ignored shift.
        direction: Direction,
        /// Why the shift was ignored.
        reason: ShiftRejection,
    },
    /// A transition was registered with the completion barrier.
    TransitionStarted {
        /// The transition awaiting completion.
        transition: Transition,
    },
    /// A cell's value changed.
    ValueChanged {
        /// Cell whose value changed.
        cell: CellIndex,
        /// New value of the cell.
        value: u32,
    },
    /// Every transition of the turn completed and the turn score was committed.
    TurnCompleted {
        /// Whether the turn's shift changed the board.
        changed: bool,
        /// Score accumulated by the turn's merges.
        turn_score: u32,
    },
    /// The total score changed.
    ScoreChanged {
        /// New total score.
        score: u32,
    },
    /// A tile was placed directly into an empty cell.
    TileSpawned {
        /// Cell that received the tile.
        cell: CellIndex,
        /// Value of the spawned tile.
        value: u32,
    },
    /// A spawn request was ignored.
    SpawnRejected {
        /// Cell named by the ignored request.
        cell: CellIndex,
        /// Why the spawn was ignored.
        reason: SpawnRejection,
    },
    /// The board has no empty cell and no adjacent equal pair.
    GameOver {
        /// Final score of the session.
        score: u32,
        /// Largest tile value reached during the session.
        max_value: u32,
    },
    /// The board was cleared and awaits its initial tiles.
    BoardReset,
}

/// Immutable copy of every cell value in row-major order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardSnapshot {
    values: [u32; CELL_COUNT],
}

impl BoardSnapshot {
    /// Creates a snapshot from row-major cell values.
    #[must_use]
    pub const fn from_values(values: [u32; CELL_COUNT]) -> Self {
        Self { values }
    }

    /// Creates a snapshot from four rows of values.
    #[must_use]
    pub fn from_rows(rows: [[u32; BOARD_SIDE]; BOARD_SIDE]) -> Self {
        let mut values = [0; CELL_COUNT];
        for (row, cells) in rows.iter().enumerate() {
            values[row * BOARD_SIDE..(row + 1) * BOARD_SIDE].copy_from_slice(cells);
        }
        Self { values }
    }

    /// Value stored in the provided cell.
    #[must_use]
    pub const fn value(&self, cell: CellIndex) -> u32 {
        self.values[cell.get()]
    }

    /// Row-major cell values.
    #[must_use]
    pub const fn values(&self) -> &[u32; CELL_COUNT] {
        &self.values
    }

    /// Values of a single row, left to right.
    #[must_use]
    pub fn row(&self, row: usize) -> [u32; BOARD_SIDE] {
        let mut out = [0; BOARD_SIDE];
        out.copy_from_slice(&self.values[row * BOARD_SIDE..(row + 1) * BOARD_SIDE]);
        out
    }

    /// Empty cells in board order.
    #[must_use]
    pub fn empty_cells(&self) -> Vec<CellIndex> {
        CellIndex::all()
            .filter(|cell| self.value(*cell) == 0)
            .collect()
    }

    /// Number of cells holding a tile.
    #[must_use]
    pub fn occupied(&self) -> usize {
        self.values.iter().filter(|value| **value != 0).count()
    }

    /// Largest tile value on the board.
    #[must_use]
    pub fn max_value(&self) -> u32 {
        self.values.iter().copied().max().unwrap_or(0)
    }
}

impl fmt::Display for BoardSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..BOARD_SIDE {
            for (column, value) in self.row(row).iter().enumerate() {
                if column > 0 {
                    f.write_str(" ")?;
                }
                if *value == 0 {
                    write!(f, "{:>5}", ".")?;
                } else {
                    write!(f, "{value:>5}")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Reports whether `value` may be stored in a cell (zero or a power of two of at least two).
#[must_use]
pub const fn is_tile_value(value: u32) -> bool {
    value == 0 || (value >= 2 && value.is_power_of_two())
}

/// Exponent of a tile value, used by presentation surfaces to pick a palette entry.
///
/// Empty cells report zero.
#[must_use]
pub const fn tile_rank(value: u32) -> u8 {
    if value == 0 {
        0
    } else {
        value.trailing_zeros() as u8
    }
}

/// Selects the spawned tile value for a percentage draw in `[0, PERCENT_RANGE)`.
#[must_use]
pub const fn spawn_value_for_roll(roll: u32) -> u32 {
    if roll < FOUR_TILE_PERCENT {
        4
    } else {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::{
        is_tile_value, spawn_value_for_roll, tile_rank, BoardSnapshot, CellIndex, Command,
        Direction, Event, ShiftRejection, Transition, TransitionId, TransitionKind,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn cell_index_maps_row_major() {
        let cell = CellIndex::at(2, 3);
        assert_eq!(cell.get(), 11);
        assert_eq!(cell.row(), 2);
        assert_eq!(cell.column(), 3);
        assert_eq!(CellIndex::new(16), None);
        assert_eq!(CellIndex::all().count(), 16);
    }

    #[test]
    fn directions_parse_from_names_and_initials() {
        assert_eq!("Left".parse::<Direction>(), Ok(Direction::Left));
        assert_eq!("u".parse::<Direction>(), Ok(Direction::Up));
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn only_right_and_down_reverse_lines() {
        assert!(Direction::Right.reverses_line());
        assert!(Direction::Down.reverses_line());
        assert!(!Direction::Left.reverses_line());
        assert!(!Direction::Up.reverses_line());
    }

    #[test]
    fn tile_values_are_zero_or_powers_of_two() {
        assert!(is_tile_value(0));
        assert!(is_tile_value(2));
        assert!(is_tile_value(2048));
        assert!(!is_tile_value(1));
        assert!(!is_tile_value(6));
        assert_eq!(tile_rank(0), 0);
        assert_eq!(tile_rank(2), 1);
        assert_eq!(tile_rank(1024), 10);
    }

    #[test]
    fn spawn_roll_threshold_selects_four_below_ten() {
        assert_eq!(spawn_value_for_roll(0), 4);
        assert_eq!(spawn_value_for_roll(9), 4);
        assert_eq!(spawn_value_for_roll(10), 2);
        assert_eq!(spawn_value_for_roll(99), 2);
    }

    #[test]
    fn snapshot_reports_empty_cells_in_board_order() {
        let snapshot = BoardSnapshot::from_rows([
            [2, 0, 0, 0],
            [0, 4, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 8],
        ]);
        let empty = snapshot.empty_cells();
        assert_eq!(empty.len(), 13);
        assert_eq!(empty[0], CellIndex::at(0, 1));
        assert_eq!(snapshot.occupied(), 3);
        assert_eq!(snapshot.max_value(), 8);
    }

    #[test]
    fn transition_event_round_trips_through_bincode() {
        let event = Event::TransitionStarted {
            transition: Transition {
                id: TransitionId::new(9),
                kind: TransitionKind::Fade,
                from: CellIndex::at(1, 1),
                to: CellIndex::at(1, 1),
                value: 0,
            },
        };
        assert_round_trip(&event);
    }

    #[test]
    fn rejection_and_command_round_trip_through_bincode() {
        assert_round_trip(&Event::ShiftRejected {
            direction: Direction::Down,
            reason: ShiftRejection::TurnInProgress,
        });
        assert_round_trip(&Command::SpawnTile {
            cell: CellIndex::at(3, 0),
            value: 4,
        });
    }
}
