#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless stand-in for an animation surface.
//!
//! The queue collects every transition the world starts and later releases a
//! `CompleteTransition` command for each of them. The release order is
//! configurable so sessions can exercise completions arriving out of start
//! order, which is what a real animation layer with varying durations does.

use std::{collections::VecDeque, fmt, str::FromStr};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};
use twenty48_core::{Command, Event, Transition};

/// Order in which started transitions report completion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionOrder {
    /// Completions arrive in start order.
    #[default]
    Fifo,
    /// The most recently started transition completes first.
    Lifo,
    /// Completions arrive in a seeded pseudo-random order.
    Shuffled,
}

impl CompletionOrder {
    /// Lowercase name used by configuration files and flags.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fifo => "fifo",
            Self::Lifo => "lifo",
            Self::Shuffled => "shuffled",
        }
    }
}

impl fmt::Display for CompletionOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a completion order name is not recognised.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown completion order `{0}`, expected fifo, lifo or shuffled")]
pub struct ParseOrderError(pub String);

impl FromStr for CompletionOrder {
    type Err = ParseOrderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fifo" => Ok(Self::Fifo),
            "lifo" => Ok(Self::Lifo),
            "shuffled" | "shuffle" => Ok(Self::Shuffled),
            _ => Err(ParseOrderError(value.to_owned())),
        }
    }
}

/// Pending transitions awaiting a completion report.
#[derive(Debug)]
pub struct CompletionQueue {
    order: CompletionOrder,
    pending: VecDeque<Transition>,
    rng: ChaCha8Rng,
}

impl CompletionQueue {
    /// Creates an empty queue releasing completions in `order`.
    ///
    /// The seed only affects [`CompletionOrder::Shuffled`].
    #[must_use]
    pub fn new(order: CompletionOrder, seed: u64) -> Self {
        Self {
            order,
            pending: VecDeque::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Configured release order.
    #[must_use]
    pub const fn order(&self) -> CompletionOrder {
        self.order
    }

    /// Number of transitions still waiting for completion.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Reports whether every collected transition was released.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Consumes world events, collecting started transitions.
    ///
    /// A board reset discards everything collected so far since the world no
    /// longer tracks those transitions.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::TransitionStarted { transition } => self.push(*transition),
                Event::BoardReset if !self.pending.is_empty() => {
                    debug!(discarded = self.pending.len(), "completion queue cleared");
                    self.clear();
                }
                _ => {}
            }
        }
    }

    /// Queues a transition reported outside an event stream.
    pub fn push(&mut self, transition: Transition) {
        trace!(id = transition.id.get(), "transition queued");
        self.pending.push_back(transition);
    }

    /// Forgets every pending transition.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Removes the next transition to complete according to the configured order.
    pub fn release(&mut self) -> Option<Transition> {
        match self.order {
            CompletionOrder::Fifo => self.pending.pop_front(),
            CompletionOrder::Lifo => self.pending.pop_back(),
            CompletionOrder::Shuffled => {
                if self.pending.is_empty() {
                    None
                } else {
                    let index = self.rng.gen_range(0..self.pending.len());
                    self.pending.swap_remove_back(index)
                }
            }
        }
    }

    /// Releases the next completion as a world command.
    pub fn next_completion(&mut self) -> Option<Command> {
        self.release()
            .map(|transition| Command::CompleteTransition { id: transition.id })
    }

    /// Releases every pending completion into `out`.
    pub fn drain(&mut self, out: &mut Vec<Command>) {
        while let Some(command) = self.next_completion() {
            out.push(command);
        }
    }
}
