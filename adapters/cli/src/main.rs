#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays twenty48 in the terminal.

mod presentation;
mod settings;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use twenty48_core::{BoardSnapshot, Direction, ParseDirectionError};
use twenty48_session::TurnController;
use twenty48_system_autoplay::Autoplay;
use twenty48_system_spawning::Config;
use twenty48_system_transitions::{CompletionOrder, CompletionQueue};
use twenty48_world::query;

use self::{presentation::TextPresentation, settings::Settings};

#[derive(Debug, Parser)]
#[command(name = "twenty48", about = "Plays a game of 2048 in the terminal")]
struct Args {
    /// TOML settings file; flags override its values.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Seed for tile spawns. Drawn from entropy when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Order in which transitions complete: fifo, lifo or shuffled.
    #[arg(long, value_name = "ORDER")]
    order: Option<CompletionOrder>,
    /// Stop automatic play after this many accepted turns.
    #[arg(long, value_name = "TURNS")]
    max_turns: Option<usize>,
    /// Moves to play, e.g. `LURD` or `left,up`. Plays automatically when omitted.
    #[arg(long, value_name = "MOVES")]
    moves: Option<String>,
    /// Replay the game from its recorded draws and fail if it diverges.
    #[arg(long)]
    verify_replay: bool,
    /// Log filter directive.
    #[arg(long, default_value = "info")]
    log: String,
}

/// Entry point for the twenty48 command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::registry()
        .with(EnvFilter::new(args.log.clone()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = resolve_settings(&args)?;
    let moves = args
        .moves
        .as_deref()
        .map(parse_moves)
        .transpose()
        .context("invalid --moves")?;

    let queue = CompletionQueue::new(
        settings.completion_order,
        settings.seed.unwrap_or_default(),
    );
    let mut controller =
        TurnController::new(Config::new(settings.seed), TextPresentation::new(queue));
    info!(
        seed = controller.spawning().sequence().seed(),
        order = %settings.completion_order,
        "session started"
    );

    match &moves {
        Some(moves) => play_moves(&mut controller, moves),
        None => play_automatically(&mut controller, settings.max_turns),
    }
    let outcome = Outcome::capture(&controller);
    println!("{outcome}");

    if settings.verify_replay {
        verify_replay(&mut controller, &outcome)?;
        println!("replay verified");
    }

    Ok(())
}

fn resolve_settings(args: &Args) -> Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => Settings::from_toml(path)?,
        None => Settings::default(),
    };

    if args.seed.is_some() {
        settings.seed = args.seed;
    }
    if let Some(order) = args.order {
        settings.completion_order = order;
    }
    if let Some(max_turns) = args.max_turns {
        settings.max_turns = max_turns;
    }
    settings.verify_replay |= args.verify_replay;
    Ok(settings)
}

fn parse_moves(text: &str) -> Result<Vec<Direction>, ParseDirectionError> {
    let mut moves = Vec::new();
    for token in text
        .split(|symbol: char| symbol == ',' || symbol.is_whitespace())
        .filter(|token| !token.is_empty())
    {
        if let Ok(direction) = token.parse() {
            moves.push(direction);
            continue;
        }
        for symbol in token.chars() {
            moves.push(symbol.to_string().parse()?);
        }
    }
    Ok(moves)
}

fn animate(controller: &mut TurnController<TextPresentation>) {
    while let Some(transition) = controller.presentation_mut().release() {
        controller.complete_transition(transition.id);
    }
}

fn play_moves(controller: &mut TurnController<TextPresentation>, moves: &[Direction]) {
    for direction in moves {
        let outcome = controller.shift(*direction);
        info!(%direction, ?outcome, "move played");
        animate(controller);
    }
}

fn play_automatically(controller: &mut TurnController<TextPresentation>, max_turns: usize) {
    let autoplay = Autoplay::new();
    for _ in 0..max_turns {
        let world = controller.world();
        let choice = autoplay.choose(query::is_game_over(world), |direction| {
            query::preview_shift(world, direction).changed
        });
        let Some(direction) = choice else {
            break;
        };

        let _ = controller.shift(direction);
        animate(controller);
    }
}

fn verify_replay(
    controller: &mut TurnController<TextPresentation>,
    expected: &Outcome,
) -> Result<()> {
    let history = controller.history().to_vec();
    controller.rewind();
    play_moves(controller, &history);

    let replayed = Outcome::capture(controller);
    if replayed != *expected {
        bail!("replay diverged:\nrecorded\n{expected}\nreplayed\n{replayed}");
    }
    if !controller.spawning().sequence().replay_finished() {
        bail!("replay finished without consuming every recorded draw");
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Outcome {
    board: BoardSnapshot,
    score: u32,
    max_value: u32,
    turns: usize,
    game_over: bool,
}

impl Outcome {
    fn capture(controller: &TurnController<TextPresentation>) -> Self {
        Self {
            board: controller.snapshot(),
            score: controller.score(),
            max_value: controller.max_value(),
            turns: controller.history().len(),
            game_over: controller.is_game_over(),
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.board)?;
        writeln!(f, "score: {}", self.score)?;
        writeln!(f, "max value: {}", self.max_value)?;
        write!(f, "turns: {}", self.turns)?;
        if self.game_over {
            write!(f, " (game over)")?;
        }
        Ok(())
    }
}
