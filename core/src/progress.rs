// orchis/src/progress.rs

//! Defines the `ProgressTracker`: a background observer of the job
//! counters, pushing increments to an injected `ProgressSink`.
//!
//! The tracker is purely observational. It never mutates the counters; it
//! mirrors them into a local view and reports the deltas it sees. The
//! sink is chosen by the caller (terminal bar, notebook widget, log
//! events), never auto-detected from the environment.

use crate::config::Config;
use crate::core::counters::JobCounters;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{event, Level};

/// Observer driven by a tracker.
///
/// `begin` is called once before the first poll, `advance` once per
/// observed increment, `finish` once when the tracked run completes.
pub trait ProgressSink: Send + Sync {
  fn begin(&self, total: usize, finished: usize, desc: &str);
  fn advance(&self, delta: usize);
  fn finish(&self);
}

/// Sink that reports progress as INFO events.
#[derive(Debug, Default)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
  fn begin(&self, total: usize, finished: usize, desc: &str) {
    event!(Level::INFO, %desc, total, finished, "Progress tracking started.");
  }

  fn advance(&self, delta: usize) {
    event!(Level::INFO, delta, "Jobs finished.");
  }

  fn finish(&self) {
    event!(Level::INFO, "Progress tracking finished.");
  }
}

/// Handle to a running tracker thread.
///
/// Dropping the handle detaches the tracker; it keeps polling until its
/// own completion condition is reached. There is no external cancellation
/// channel.
#[derive(Debug)]
pub struct ProgressHandle {
  thread: JoinHandle<()>,
}

impl ProgressHandle {
  /// True once the tracker loop has terminated.
  pub fn is_finished(&self) -> bool {
    self.thread.is_finished()
  }

  /// Blocks until the tracker loop terminates.
  pub fn join(self) {
    // A panicking sink is the only way the thread can die abnormally.
    let _ = self.thread.join();
  }
}

/// Spawns polling loops over a selection's counters.
pub struct ProgressTracker;

impl ProgressTracker {
  /// Spawns a tracker with the process-wide polling interval.
  pub fn spawn(
    counters: Arc<JobCounters>,
    sink: Arc<dyn ProgressSink>,
    desc: impl Into<String>,
  ) -> ProgressHandle {
    Self::spawn_with_interval(counters, sink, desc, Config::global().progress_interval)
  }

  /// Spawns a tracker polling every `interval`.
  ///
  /// Total-at-start semantics: the tracked total is `queued + finished`
  /// captured here. Jobs submitted after the loop starts are not part of
  /// this run; a later tracker picks them up. The loop shifts
  /// `previous_queued - current_queued` from its local queued count to
  /// its local finished count on each tick and terminates when the local
  /// finished count reaches the captured total.
  pub fn spawn_with_interval(
    counters: Arc<JobCounters>,
    sink: Arc<dyn ProgressSink>,
    desc: impl Into<String>,
    interval: Duration,
  ) -> ProgressHandle {
    let desc = desc.into();
    let thread = thread::spawn(move || {
      let start = counters.snapshot();
      let total = start.total();
      sink.begin(total, start.finished, &desc);
      event!(Level::DEBUG, %desc, total, initial_finished = start.finished, "Tracker loop starting.");

      let mut local_queued = start.queued;
      let mut local_finished = start.finished;
      while local_finished < total {
        let delta = local_queued.saturating_sub(counters.queued());
        if delta > 0 {
          local_queued -= delta;
          local_finished += delta;
          sink.advance(delta);
        }
        thread::sleep(interval);
      }

      sink.finish();
      event!(Level::DEBUG, %desc, "Tracker loop terminated.");
    });

    ProgressHandle { thread }
  }
}
