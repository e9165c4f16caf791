//! Single board position and its transfer decisions.

use twenty48_core::{CellIndex, TransitionKind};

/// A board position holding a tile value (zero when empty).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    index: CellIndex,
    value: u32,
}

impl Cell {
    pub(crate) const fn new(index: CellIndex, value: u32) -> Self {
        Self { index, value }
    }

    pub(crate) const fn index(&self) -> CellIndex {
        self.index
    }

    pub(crate) const fn value(&self) -> u32 {
        self.value
    }

    /// Stores `value`, reporting whether the cell actually changed.
    pub(crate) fn set_value(&mut self, value: u32) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        true
    }

    /// Decides how this cell's tile reaches `target` carrying `value`.
    ///
    /// Returns `None` when the tile already sits at `target` with `value`,
    /// meaning nothing has to animate. The cell itself is not touched; the
    /// world applies the effect once the transition completes.
    pub(crate) fn request_transfer(&self, target: CellIndex, value: u32) -> Option<TransitionKind> {
        if target != self.index {
            return Some(TransitionKind::Move);
        }

        if value == self.value {
            None
        } else {
            Some(TransitionKind::Fade)
        }
    }
}
