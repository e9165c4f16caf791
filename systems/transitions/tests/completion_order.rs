use twenty48_core::{BoardSnapshot, Command, Direction, Event};
use twenty48_system_transitions::{CompletionOrder, CompletionQueue};
use twenty48_world::{self as world, query, World};

fn run(board: BoardSnapshot, moves: &[Direction], order: CompletionOrder) -> (BoardSnapshot, u32) {
    let mut world = World::from_snapshot(board);
    let mut queue = CompletionQueue::new(order, 0xa11ce);

    for direction in moves {
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::Shift {
                direction: *direction,
            },
            &mut events,
        );
        queue.handle(&events);

        while let Some(command) = queue.next_completion() {
            let mut completion_events = Vec::new();
            world::apply(&mut world, command, &mut completion_events);
            queue.handle(&completion_events);
        }
        assert!(query::is_settled(&world));
    }

    (query::snapshot(&world), query::score(&world))
}

#[test]
fn every_order_settles_to_the_same_board() {
    let board = BoardSnapshot::from_rows([
        [2, 2, 4, 8],
        [0, 4, 4, 4],
        [2, 0, 2, 2],
        [8, 8, 0, 16],
    ]);
    let moves = [
        Direction::Left,
        Direction::Down,
        Direction::Right,
        Direction::Up,
        Direction::Left,
    ];

    let fifo = run(board, &moves, CompletionOrder::Fifo);
    let lifo = run(board, &moves, CompletionOrder::Lifo);
    let shuffled = run(board, &moves, CompletionOrder::Shuffled);

    assert_eq!(fifo, lifo);
    assert_eq!(fifo, shuffled);
    assert!(fifo.1 > 0);
}

#[test]
fn queue_ignores_events_other_than_started_transitions() {
    let mut queue = CompletionQueue::new(CompletionOrder::Lifo, 1);
    queue.handle(&[
        Event::ScoreChanged { score: 8 },
        Event::TurnCompleted {
            changed: true,
            turn_score: 8,
        },
    ]);
    assert!(queue.is_empty());
    assert_eq!(queue.order(), CompletionOrder::Lifo);
}
