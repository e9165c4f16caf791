//! Keyed random streams that record every draw and can replay them.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;
use twenty48_core::StreamKey;

use crate::Config;

/// Recorded draws of every stream, in draw order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recording {
    streams: BTreeMap<StreamKey, Vec<u32>>,
}

impl Recording {
    /// Creates a recording without any draws.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the draws recorded for `key`.
    #[must_use]
    pub fn with_stream(mut self, key: StreamKey, draws: Vec<u32>) -> Self {
        let _ = self.streams.insert(key, draws);
        self
    }

    /// Draws recorded for `key`, empty when the stream was never used.
    #[must_use]
    pub fn stream(&self, key: StreamKey) -> &[u32] {
        self.streams.get(&key).map(Vec::as_slice).unwrap_or_default()
    }
}

#[derive(Clone, Debug, Default)]
struct History {
    draws: Vec<u32>,
    cursor: usize,
}

impl History {
    fn is_finished(&self) -> bool {
        self.cursor == self.draws.len()
    }
}

/// Deterministic source of bounded integers keyed by stream.
///
/// Every fresh draw is appended to the stream it was requested from. After
/// [`RandomSequence::replay`] the recorded draws are handed out again in the
/// same order before the generator is consulted, so a session driven by the
/// same inputs reproduces exactly.
#[derive(Clone, Debug)]
pub struct RandomSequence {
    rng: ChaCha8Rng,
    seed: u64,
    streams: BTreeMap<StreamKey, History>,
}

impl RandomSequence {
    /// Creates a sequence seeded from the configuration, or from entropy when
    /// no seed is configured.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let seed = config.rng_seed().unwrap_or_else(rand::random);
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            streams: BTreeMap::new(),
        }
    }

    /// Creates a sequence that hands out `recording` before drawing fresh values.
    #[must_use]
    pub fn from_recording(recording: Recording, config: Config) -> Self {
        let mut sequence = Self::new(config);
        sequence.streams = recording
            .streams
            .into_iter()
            .map(|(key, draws)| (key, History { draws, cursor: 0 }))
            .collect();
        sequence
    }

    /// Returns the next value of stream `key` in `[0, max)`.
    ///
    /// # Panics
    ///
    /// Panics when `max` is zero, or when a replayed draw is not below `max`.
    /// The latter means the replaying session diverged from the recorded one.
    pub fn next(&mut self, max: u32, key: StreamKey) -> u32 {
        assert!(max > 0, "random draw requested from an empty range");

        let history = self.streams.entry(key).or_default();
        if let Some(&draw) = history.draws.get(history.cursor) {
            assert!(
                draw < max,
                "replayed {} draw {draw} is outside [0, {max})",
                key.as_str()
            );
            history.cursor += 1;
            trace!(stream = key.as_str(), draw, max, "replayed draw");
            return draw;
        }

        let draw = self.rng.gen_range(0..max);
        history.draws.push(draw);
        history.cursor = history.draws.len();
        trace!(stream = key.as_str(), draw, max, "fresh draw");
        draw
    }

    /// Rewinds every stream to its first recorded draw.
    pub fn replay(&mut self) {
        for history in self.streams.values_mut() {
            history.cursor = 0;
        }
    }

    /// Reports whether every recorded draw was handed out again.
    #[must_use]
    pub fn replay_finished(&self) -> bool {
        self.streams.values().all(History::is_finished)
    }

    /// Exports the draws recorded so far.
    #[must_use]
    pub fn recording(&self) -> Recording {
        Recording {
            streams: self
                .streams
                .iter()
                .map(|(key, history)| (*key, history.draws.clone()))
                .collect(),
        }
    }

    /// Seed the generator started from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_draws_are_recorded_per_stream() {
        let mut sequence = RandomSequence::new(Config::seeded(7));
        let cells: Vec<u32> = (0..5).map(|_| sequence.next(16, StreamKey::Cell)).collect();
        let value = sequence.next(100, StreamKey::Value);

        let recording = sequence.recording();
        assert_eq!(recording.stream(StreamKey::Cell), cells.as_slice());
        assert_eq!(recording.stream(StreamKey::Value), &[value]);
        assert!(cells.iter().all(|draw| *draw < 16));
        assert!(sequence.replay_finished());
    }

    #[test]
    fn replay_hands_out_recorded_draws_again() {
        let mut sequence = RandomSequence::new(Config::seeded(0xfeed));
        let first: Vec<u32> = (0..8).map(|_| sequence.next(100, StreamKey::Value)).collect();

        sequence.replay();
        assert!(!sequence.replay_finished());
        let second: Vec<u32> = (0..8).map(|_| sequence.next(100, StreamKey::Value)).collect();

        assert_eq!(first, second);
        assert!(sequence.replay_finished());
    }

    #[test]
    fn draws_past_the_recording_extend_it() {
        let recording = Recording::new().with_stream(StreamKey::Cell, vec![3]);
        let mut sequence = RandomSequence::from_recording(recording, Config::seeded(1));

        assert_eq!(sequence.next(16, StreamKey::Cell), 3);
        assert!(sequence.replay_finished());
        let _ = sequence.next(15, StreamKey::Cell);
        assert_eq!(sequence.recording().stream(StreamKey::Cell).len(), 2);
    }

    #[test]
    fn unused_streams_do_not_block_replay_finished() {
        let sequence = RandomSequence::new(Config::seeded(3));
        assert!(sequence.replay_finished());
    }

    #[test]
    fn same_seed_draws_the_same_values() {
        let mut first = RandomSequence::new(Config::seeded(99));
        let mut second = RandomSequence::new(Config::seeded(99));
        for max in [16, 15, 100, 14, 100] {
            assert_eq!(
                first.next(max, StreamKey::Cell),
                second.next(max, StreamKey::Cell)
            );
        }
        assert_eq!(first.seed(), 99);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn replayed_draw_beyond_range_is_fatal() {
        let recording = Recording::new().with_stream(StreamKey::Cell, vec![12]);
        let mut sequence = RandomSequence::from_recording(recording, Config::seeded(1));
        let _ = sequence.next(4, StreamKey::Cell);
    }

    #[test]
    #[should_panic(expected = "empty range")]
    fn empty_range_is_fatal() {
        let mut sequence = RandomSequence::new(Config::seeded(1));
        let _ = sequence.next(0, StreamKey::Value);
    }
}
