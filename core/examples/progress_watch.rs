// orchis/examples/progress_watch.rs

use orchis::{JobCounters, ProgressSink, ProgressTracker};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

// A sink rendering a plain-text progress line. The tracker takes whatever
// sink the caller injects: terminal, notebook widget, log events.
struct ConsoleSink;

impl ProgressSink for ConsoleSink {
  fn begin(&self, total: usize, finished: usize, desc: &str) {
    println!("[{}] {}/{} jobs finished", desc, finished, total);
  }

  fn advance(&self, delta: usize) {
    println!("  +{} job(s) finished", delta);
  }

  fn finish(&self) {
    println!("done.");
  }
}

fn main() {
  // The interface collaborator owns the counters; here we stand in for it.
  let counters = Arc::new(JobCounters::new());
  counters.submit(6);

  let handle = ProgressTracker::spawn_with_interval(
    Arc::clone(&counters),
    Arc::new(ConsoleSink),
    "T1proc",
    Duration::from_millis(50),
  );

  // Simulate a worker pool draining the queue.
  for _ in 0..6 {
    thread::sleep(Duration::from_millis(120));
    counters.complete(1);
  }

  // The tracker self-terminates once its captured total is reached.
  handle.join();
}
