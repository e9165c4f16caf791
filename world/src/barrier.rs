//! Edge-triggered counter gating turn completion.

/// Counts transitions that started but have not completed yet.
///
/// The barrier settles exactly when the count crosses from one to zero. The
/// settle signal is returned to the caller instead of being dispatched from
/// inside the barrier, so work triggered by a settle may increment and
/// decrement the barrier again without observing a half-updated count.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompletionBarrier {
    pending: u32,
}

impl CompletionBarrier {
    /// Creates a barrier with nothing pending.
    #[must_use]
    pub const fn new() -> Self {
        Self { pending: 0 }
    }

    /// Registers one more pending completion.
    pub fn increment(&mut self) {
        self.pending += 1;
    }

    /// Releases one pending completion.
    ///
    /// Returns `true` only when this call moved the count from one to zero.
    ///
    /// # Panics
    ///
    /// Panics when nothing is pending. An unmatched decrement means a
    /// completion was reported twice or for a transition that never started.
    #[must_use = "the settle edge must be handled by the caller"]
    pub fn decrement(&mut self) -> bool {
        assert!(
            self.pending > 0,
            "completion barrier decremented below zero"
        );
        self.pending -= 1;
        self.pending == 0
    }

    /// Reports whether no completion is pending.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.pending == 0
    }

    /// Number of completions still pending.
    #[must_use]
    pub const fn pending(&self) -> u32 {
        self.pending
    }

    pub(crate) fn reset(&mut self) {
        self.pending = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::CompletionBarrier;

    #[test]
    fn settles_only_on_last_release() {
        let mut barrier = CompletionBarrier::new();
        barrier.increment();
        barrier.increment();
        barrier.increment();

        assert!(!barrier.decrement());
        assert!(!barrier.decrement());
        assert!(barrier.decrement());
        assert!(barrier.is_zero());
    }

    #[test]
    fn increments_after_settle_start_a_fresh_cycle() {
        let mut barrier = CompletionBarrier::new();
        barrier.increment();
        assert!(barrier.decrement());

        // Work triggered by the settle may register new completions.
        barrier.increment();
        barrier.increment();
        assert_eq!(barrier.pending(), 2);
        assert!(!barrier.decrement());
        assert!(barrier.decrement());
    }

    #[test]
    fn interleaved_registration_delays_the_edge() {
        let mut barrier = CompletionBarrier::new();
        barrier.increment();
        barrier.increment();
        assert!(!barrier.decrement());

        // A completion handler registers another transition before the last release.
        barrier.increment();
        assert!(!barrier.decrement());
        assert!(barrier.decrement());
    }

    #[test]
    #[should_panic(expected = "below zero")]
    fn decrement_at_zero_is_fatal() {
        let mut barrier = CompletionBarrier::new();
        let _ = barrier.decrement();
    }

    #[test]
    fn reset_discards_pending_completions() {
        let mut barrier = CompletionBarrier::new();
        barrier.increment();
        barrier.reset();
        assert!(barrier.is_zero());
    }
}
