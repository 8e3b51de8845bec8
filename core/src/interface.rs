// orchis/src/interface.rs

//! The per-selection processing interface boundary.
//!
//! An `Interface` is built by the plugin-supplied provider whenever a
//! package is (re)selected. It owns what the engine only observes: the
//! produced-data namespaces (processed/reported/masked), the queued and
//! finished job counters, the running worker handles, and the ability to
//! destroy previously produced steps.

use crate::bucket::{Bucket, StepCode};
use crate::core::counters::JobCounters;
use crate::error::OrchisResult;
use std::collections::BTreeMap;
use std::sync::Arc;

/// How `destroy_step` should treat the data belonging to a step code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemoveMode {
  /// Remove processed output (the default).
  #[default]
  Processing,
  /// Remove report output.
  Reporting,
}

impl std::fmt::Display for RemoveMode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      RemoveMode::Processing => write!(f, "processing"),
      RemoveMode::Reporting => write!(f, "reporting"),
    }
  }
}

/// Options forwarded to the provider when an interface is built.
#[derive(Debug, Clone)]
pub struct InterfaceOptions {
  pub logging: bool,
  pub n_threads: usize,
}

/// Worker handles for one running step, exposed as opaque labels.
#[derive(Debug, Clone, Default)]
pub struct StepWorkers {
  pub schedulers: Vec<String>,
  pub managers: Vec<String>,
}

/// The processing interface bound to one bucket and one package title.
pub trait Interface: Send + Sync {
  /// The package label this interface was built for.
  fn label(&self) -> String;

  /// Refreshes the produced-data namespaces from storage.
  fn update(&self);

  /// Step codes with processed output, with their step names.
  fn processed(&self) -> BTreeMap<StepCode, String>;

  /// Step codes with report output.
  fn reported(&self) -> BTreeMap<StepCode, String>;

  /// Step codes with mask data. Masks are not package-scoped.
  fn masked(&self) -> BTreeMap<StepCode, String>;

  /// Names of steps waiting in the execution queue.
  fn waiting(&self) -> Vec<String>;

  /// The queued/finished counters this interface maintains. The engine
  /// and its trackers only ever read them.
  fn counters(&self) -> Arc<JobCounters>;

  /// Worker handles per running step name.
  fn running(&self) -> BTreeMap<String, StepWorkers>;

  /// Destroys previously produced data for `code`.
  fn destroy_step(&self, code: &StepCode, mode: RemoveMode) -> OrchisResult<()>;
}

/// Builds interfaces for selections; supplied by the plugin layer.
pub trait InterfaceProvider: Send + Sync {
  fn interface(
    &self,
    bucket: Arc<dyn Bucket>,
    title: &str,
    opts: &InterfaceOptions,
  ) -> Arc<dyn Interface>;
}
