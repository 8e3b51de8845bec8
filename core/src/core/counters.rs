// orchis/src/core/counters.rs

//! Shared queued/finished job tallies.
//!
//! The counters are owned and mutated by the interface collaborator as it
//! submits and completes jobs; the progress tracker only reads them. An
//! atomic pair keeps the read side lock-free, so the tracker can poll at
//! any rate without a locking discipline between the two sides.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Externally owned job counters for one selection.
///
/// Invariant over the lifetime of one run: `queued` is non-increasing,
/// `finished` is non-decreasing, and their sum stays at the total that was
/// submitted for the run.
#[derive(Debug, Default)]
pub struct JobCounters {
  queued: AtomicUsize,
  finished: AtomicUsize,
}

/// A point-in-time read of both counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSnapshot {
  pub queued: usize,
  pub finished: usize,
}

impl CounterSnapshot {
  /// Total work represented by this snapshot.
  pub fn total(&self) -> usize {
    self.queued + self.finished
  }
}

impl JobCounters {
  pub fn new() -> Self {
    Self::default()
  }

  /// Records `n` newly submitted jobs. Called by the interface only.
  pub fn submit(&self, n: usize) {
    self.queued.fetch_add(n, Ordering::SeqCst);
  }

  /// Moves `n` jobs from queued to finished. Called by the interface only.
  pub fn complete(&self, n: usize) {
    // Clamp rather than underflow if the producer completes more than it
    // queued; the tracker works off deltas and tolerates the clamp.
    let mut current = self.queued.load(Ordering::SeqCst);
    loop {
      let taken = n.min(current);
      match self.queued.compare_exchange(
        current,
        current - taken,
        Ordering::SeqCst,
        Ordering::SeqCst,
      ) {
        Ok(_) => {
          self.finished.fetch_add(taken, Ordering::SeqCst);
          return;
        }
        Err(observed) => current = observed,
      }
    }
  }

  pub fn queued(&self) -> usize {
    self.queued.load(Ordering::SeqCst)
  }

  pub fn finished(&self) -> usize {
    self.finished.load(Ordering::SeqCst)
  }

  pub fn snapshot(&self) -> CounterSnapshot {
    CounterSnapshot {
      queued: self.queued(),
      finished: self.finished(),
    }
  }
}
