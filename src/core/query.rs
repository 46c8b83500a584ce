//! Debounced query controller.
//!
//! Input is coalesced by a [`Debouncer`]: every keystroke re-arms it, and
//! only an uninterrupted quiet period lets the value settle. Nothing here
//! reads the clock; callers pass `now`, which keeps the timing testable and
//! lets any event loop drive it.
//!
//! Every keystroke also bumps a generation counter. A remote reply is only
//! applied when the generation it was dispatched with is still current, so
//! a slow response for an older query can never overwrite newer results.

use std::time::{Duration, Instant};

/// Cancellable fire-once timer holding the value to deliver.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    /// Arm with `value`, replacing anything pending and restarting the
    /// quiet period from `now`.
    pub fn arm(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.quiet));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Deliver the pending value once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let deadline = self.deadline()?;
        if now >= deadline {
            self.pending.take().map(|(v, _)| v)
        } else {
            None
        }
    }

    /// Deliver the pending value immediately.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(v, _)| v)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }
}

/// Outcome of feeding raw input to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Below the minimum length; results must be cleared now.
    Cleared,
    /// Waiting for the quiet period to elapse.
    Pending,
}

/// A query that survived the quiet period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettledQuery {
    pub query: String,
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub struct QueryController {
    raw: String,
    settled: Option<String>,
    generation: u64,
    min_length: usize,
    debouncer: Debouncer<String>,
}

impl QueryController {
    pub fn new(quiet: Duration, min_length: usize) -> Self {
        Self {
            raw: String::new(),
            settled: None,
            generation: 0,
            min_length,
            debouncer: Debouncer::new(quiet),
        }
    }

    pub fn input(&mut self, text: &str, now: Instant) -> InputOutcome {
        self.raw = text.to_string();
        self.generation += 1;

        let trimmed = text.trim();
        if trimmed.chars().count() < self.min_length {
            self.debouncer.cancel();
            self.settled = None;
            return InputOutcome::Cleared;
        }

        self.debouncer.arm(trimmed.to_string(), now);
        InputOutcome::Pending
    }

    pub fn poll(&mut self, now: Instant) -> Option<SettledQuery> {
        let query = self.debouncer.poll(now)?;
        Some(self.settle(query))
    }

    /// Settle immediately without waiting for the quiet period.
    pub fn flush(&mut self) -> Option<SettledQuery> {
        let query = self.debouncer.flush()?;
        Some(self.settle(query))
    }

    fn settle(&mut self, query: String) -> SettledQuery {
        self.settled = Some(query.clone());
        SettledQuery {
            query,
            generation: self.generation,
        }
    }

    /// Drop pending work and forget the query. The generation still moves
    /// forward so replies already in flight are discarded.
    pub fn reset(&mut self) {
        self.debouncer.cancel();
        self.raw.clear();
        self.settled = None;
        self.generation += 1;
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn settled(&self) -> Option<&str> {
        self.settled.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_armed()
    }
}
