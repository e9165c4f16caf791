//! Pure shift planner operating on a board snapshot.
//!
//! The planner decides every merge of a shift from one consistent snapshot and
//! expresses the outcome as transfer requests. Nothing here mutates the board;
//! the world turns non-identity requests into transitions and applies their
//! effects as completions arrive.

use twenty48_core::{BoardSnapshot, CellIndex, Direction, BOARD_SIDE, CELL_COUNT};

/// Transfer of the tile at `from` to `to`, carrying `value`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TransferRequest {
    pub(crate) from: CellIndex,
    pub(crate) to: CellIndex,
    pub(crate) value: u32,
}

impl TransferRequest {
    /// Reports whether the request leaves the board untouched.
    pub(crate) fn is_identity(&self, snapshot: &BoardSnapshot) -> bool {
        self.from == self.to && self.value == snapshot.value(self.from)
    }
}

/// Cells a completed transfer writes.
///
/// A cell that receives a moved tile in the same shift is never cleared as a
/// source and never zeroed by a fade, which makes the settled board independent
/// of the order in which completions arrive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TransferEffect {
    pub(crate) write_target: bool,
    pub(crate) clear_source: bool,
}

/// Every transfer decided by one shift, in request order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ShiftPlan {
    pub(crate) requests: Vec<TransferRequest>,
    pub(crate) merges: u32,
    pub(crate) score: u32,
    pub(crate) max_merged: u32,
}

impl ShiftPlan {
    /// Reports whether any request would start a transition.
    pub(crate) fn changes(&self, snapshot: &BoardSnapshot) -> bool {
        self.requests
            .iter()
            .any(|request| !request.is_identity(snapshot))
    }

    /// Resolves the write set of each request.
    pub(crate) fn effects(&self) -> Vec<TransferEffect> {
        let mut receives_move = [false; CELL_COUNT];
        for request in &self.requests {
            if request.from != request.to {
                receives_move[request.to.get()] = true;
            }
        }

        self.requests
            .iter()
            .map(|request| {
                if request.from == request.to {
                    TransferEffect {
                        write_target: !receives_move[request.to.get()],
                        clear_source: false,
                    }
                } else {
                    TransferEffect {
                        write_target: true,
                        clear_source: !receives_move[request.from.get()],
                    }
                }
            })
            .collect()
    }

    /// Board values once every transfer of the plan completed.
    pub(crate) fn settled(&self, snapshot: &BoardSnapshot) -> BoardSnapshot {
        let mut values = *snapshot.values();
        for (request, effect) in self.requests.iter().zip(self.effects()) {
            if request.is_identity(snapshot) {
                continue;
            }
            if effect.write_target {
                values[request.to.get()] = request.value;
            }
            if effect.clear_source {
                values[request.from.get()] = 0;
            }
        }
        BoardSnapshot::from_values(values)
    }
}

/// Cells of one row or column, ordered so traversal starts at the wall the
/// tiles slide toward.
///
/// Rows are contiguous runs of four cells; columns stride by the board side.
pub(crate) fn line_cells(direction: Direction, line: usize) -> [CellIndex; BOARD_SIDE] {
    let mut cells = [CellIndex::at(0, 0); BOARD_SIDE];
    for (offset, slot) in cells.iter_mut().enumerate() {
        *slot = if direction.is_horizontal() {
            CellIndex::at(line, offset)
        } else {
            CellIndex::at(offset, line)
        };
    }
    if direction.reverses_line() {
        cells.reverse();
    }
    cells
}

/// Plans a shift of every line toward `direction`.
pub(crate) fn plan(snapshot: &BoardSnapshot, direction: Direction) -> ShiftPlan {
    let mut plan = ShiftPlan::default();
    for line in 0..BOARD_SIDE {
        plan_line(snapshot, &line_cells(direction, line), &mut plan);
    }
    plan
}

fn plan_line(snapshot: &BoardSnapshot, line: &[CellIndex; BOARD_SIDE], plan: &mut ShiftPlan) {
    let sources: Vec<CellIndex> = line
        .iter()
        .copied()
        .filter(|cell| snapshot.value(*cell) != 0)
        .collect();
    if sources.is_empty() {
        return;
    }

    let mut outgoing: Vec<(CellIndex, u32)> = Vec::with_capacity(sources.len());
    let mut index = 0;
    while index < sources.len() {
        let mut value = snapshot.value(sources[index]);

        // Single lookahead: the merge product moves on and is never re-scanned.
        let merges_with_next = sources
            .get(index + 1)
            .is_some_and(|next| snapshot.value(*next) == value);
        if merges_with_next {
            plan.requests.push(TransferRequest {
                from: sources[index],
                to: sources[index],
                value: 0,
            });
            value *= 2;
            plan.merges += 1;
            plan.score += value;
            plan.max_merged = plan.max_merged.max(value);
            index += 1;
        }

        outgoing.push((sources[index], value));
        index += 1;
    }

    for (rank, (source, value)) in outgoing.into_iter().enumerate() {
        plan.requests.push(TransferRequest {
            from: source,
            to: line[rank],
            value,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_row(values: [u32; BOARD_SIDE]) -> BoardSnapshot {
        BoardSnapshot::from_rows([values, [0; 4], [0; 4], [0; 4]])
    }

    #[test]
    fn rows_are_contiguous_and_columns_strided() {
        let row = line_cells(Direction::Left, 1);
        assert_eq!(row.map(CellIndex::get), [4, 5, 6, 7]);

        let reversed_row = line_cells(Direction::Right, 1);
        assert_eq!(reversed_row.map(CellIndex::get), [7, 6, 5, 4]);

        let column = line_cells(Direction::Up, 2);
        assert_eq!(column.map(CellIndex::get), [2, 6, 10, 14]);

        let reversed_column = line_cells(Direction::Down, 2);
        assert_eq!(reversed_column.map(CellIndex::get), [14, 10, 6, 2]);
    }

    #[test]
    fn leading_pair_merges_once_toward_low_end() {
        let snapshot = single_row([2, 2, 4, 0]);
        let plan = plan(&snapshot, Direction::Left);

        assert_eq!(plan.merges, 1);
        assert_eq!(plan.score, 4);
        assert_eq!(plan.max_merged, 4);
        assert!(plan.changes(&snapshot));
        assert_eq!(plan.settled(&snapshot).row(0), [4, 4, 0, 0]);
    }

    #[test]
    fn merge_precedence_starts_at_the_destination_wall() {
        let snapshot = single_row([2, 2, 2, 0]);

        let left = plan(&snapshot, Direction::Left);
        assert_eq!(left.settled(&snapshot).row(0), [4, 2, 0, 0]);

        let right = plan(&snapshot, Direction::Right);
        assert_eq!(right.settled(&snapshot).row(0), [0, 0, 2, 4]);
    }

    #[test]
    fn full_row_of_pairs_merges_twice() {
        let snapshot = single_row([4, 4, 4, 4]);
        let plan = plan(&snapshot, Direction::Left);

        assert_eq!(plan.merges, 2);
        assert_eq!(plan.score, 16);
        assert_eq!(plan.settled(&snapshot).row(0), [8, 8, 0, 0]);
    }

    #[test]
    fn merged_tile_is_not_merged_again() {
        let snapshot = single_row([4, 2, 2, 0]);
        let plan = plan(&snapshot, Direction::Left);

        assert_eq!(plan.merges, 1);
        assert_eq!(plan.settled(&snapshot).row(0), [4, 4, 0, 0]);
    }

    #[test]
    fn distinct_full_row_is_unchanged_both_ways() {
        let snapshot = single_row([2, 4, 8, 16]);
        for direction in [Direction::Left, Direction::Right] {
            let plan = plan(&snapshot, direction);
            assert!(!plan.changes(&snapshot));
            assert_eq!(plan.merges, 0);
            assert_eq!(plan.settled(&snapshot), snapshot);
        }
    }

    #[test]
    fn gaps_are_compacted_without_merging_distinct_values() {
        let snapshot = BoardSnapshot::from_rows([[0; 4], [0; 4], [0; 4], [2, 0, 4, 0]]);
        let plan = plan(&snapshot, Direction::Right);

        assert_eq!(plan.merges, 0);
        assert_eq!(plan.settled(&snapshot).row(3), [0, 0, 2, 4]);
    }

    #[test]
    fn columns_merge_toward_the_bottom() {
        let snapshot = BoardSnapshot::from_rows([[2, 0, 0, 0], [2, 0, 0, 0], [0; 4], [8, 0, 0, 0]]);
        let settled = plan(&snapshot, Direction::Down).settled(&snapshot);

        assert_eq!(settled.value(CellIndex::at(3, 0)), 8);
        assert_eq!(settled.value(CellIndex::at(2, 0)), 4);
        assert_eq!(settled.value(CellIndex::at(1, 0)), 0);
        assert_eq!(settled.value(CellIndex::at(0, 0)), 0);
    }

    #[test]
    fn merge_target_is_protected_from_its_fade() {
        let snapshot = single_row([2, 2, 0, 0]);
        let plan = plan(&snapshot, Direction::Left);
        let effects = plan.effects();

        // Fade of cell 0 followed by the move of cell 1 into cell 0.
        assert_eq!(plan.requests.len(), 2);
        assert_eq!(plan.requests[0].from, plan.requests[0].to);
        assert!(!effects[0].write_target);
        assert!(effects[1].write_target);
        assert!(effects[1].clear_source);
    }
}
