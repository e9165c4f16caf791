use twenty48_core::{BoardSnapshot, Direction};
use twenty48_system_autoplay::Autoplay;
use twenty48_world::{query, World};

fn choose(world: &World) -> Option<Direction> {
    Autoplay::new().choose(query::is_game_over(world), |direction| {
        query::preview_shift(world, direction).changed
    })
}

#[test]
fn top_left_packed_row_moves_right() {
    let world = World::from_snapshot(BoardSnapshot::from_rows([
        [2, 4, 0, 0],
        [0, 0, 0, 0],
        [0, 0, 0, 0],
        [0, 0, 0, 0],
    ]));
    // Left and Up change nothing, so Right is next.
    assert_eq!(choose(&world), Some(Direction::Right));
}

#[test]
fn tile_below_the_top_moves_up() {
    let world = World::from_snapshot(BoardSnapshot::from_rows([
        [0, 0, 0, 0],
        [2, 0, 0, 0],
        [0, 0, 0, 0],
        [0, 0, 0, 0],
    ]));
    assert_eq!(choose(&world), Some(Direction::Up));
}

#[test]
fn bottom_right_packed_board_moves_left() {
    let world = World::from_snapshot(BoardSnapshot::from_rows([
        [0, 0, 0, 0],
        [0, 0, 0, 0],
        [0, 0, 0, 0],
        [0, 0, 0, 2],
    ]));
    assert_eq!(choose(&world), Some(Direction::Left));
}

#[test]
fn packed_top_rows_fall_down() {
    let world = World::from_snapshot(BoardSnapshot::from_rows([
        [2, 4, 8, 16],
        [4, 8, 16, 32],
        [0, 0, 0, 0],
        [0, 0, 0, 0],
    ]));
    assert_eq!(choose(&world), Some(Direction::Down));
}

#[test]
fn terminal_board_stops_autoplay() {
    let world = World::from_snapshot(BoardSnapshot::from_rows([
        [2, 4, 2, 4],
        [4, 2, 4, 2],
        [2, 4, 2, 4],
        [4, 2, 4, 2],
    ]));
    assert_eq!(choose(&world), None);
}
