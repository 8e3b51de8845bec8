// orchis/src/bucket.rs

//! The dataset storage/indexing collaborator boundary, plus the small data
//! types the engine exchanges with it: dataset categories, query filters,
//! dataset views, and step codes addressing previously produced data.
//!
//! Orchis never implements storage itself. A `Bucket` is shared (not owned)
//! by the orchestrator and everything derived from it.

use crate::error::{OrchisError, OrchisResult};
use std::path::PathBuf;

/// Conventional image extension used when a caller does not specify one.
pub const DEFAULT_EXT: &str = "nii.gz";

/// A 3-character identifier addressing previously produced data.
///
/// Step codes live in a different namespace than step indices: an index
/// selects a step to *run*, a code selects data a step already *produced*.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StepCode(String);

impl StepCode {
  /// Validates and wraps a code. Anything but exactly 3 characters fails
  /// with `MalformedStepCode`.
  pub fn new(code: &str) -> OrchisResult<Self> {
    if code.chars().count() != 3 {
      return Err(OrchisError::MalformedStepCode {
        code: code.to_string(),
      });
    }
    Ok(StepCode(code.to_string()))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl std::fmt::Display for StepCode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl std::str::FromStr for StepCode {
  type Err = OrchisError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    StepCode::new(s)
  }
}

/// One step code or several; removal accepts either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepCodes {
  One(String),
  Many(Vec<String>),
}

impl StepCodes {
  /// Validates every element up front and returns the parsed codes.
  /// Nothing is considered applied unless the whole input is well-formed.
  pub fn validate(&self) -> OrchisResult<Vec<StepCode>> {
    match self {
      StepCodes::One(code) => Ok(vec![StepCode::new(code)?]),
      StepCodes::Many(codes) => codes.iter().map(|c| StepCode::new(c)).collect(),
    }
  }
}

impl From<&str> for StepCodes {
  fn from(code: &str) -> Self {
    StepCodes::One(code.to_string())
  }
}

impl From<String> for StepCodes {
  fn from(code: String) -> Self {
    StepCodes::One(code)
  }
}

impl From<Vec<&str>> for StepCodes {
  fn from(codes: Vec<&str>) -> Self {
    StepCodes::Many(codes.into_iter().map(String::from).collect())
  }
}

impl From<Vec<String>> for StepCodes {
  fn from(codes: Vec<String>) -> Self {
    StepCodes::Many(codes)
  }
}

impl From<&[&str]> for StepCodes {
  fn from(codes: &[&str]) -> Self {
    StepCodes::Many(codes.iter().map(|c| c.to_string()).collect())
  }
}

/// The three categories previously produced data can belong to.
///
/// A given step code belongs to exactly one category, decided by probing
/// the collaborator's namespaces in this order: processed, reported,
/// masked. The first hit wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataClass {
  Processed,
  Reported,
  Masked,
}

impl std::fmt::Display for DataClass {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      DataClass::Processed => write!(f, "processed"),
      DataClass::Reported => write!(f, "reported"),
      DataClass::Masked => write!(f, "masked"),
    }
  }
}

/// Query filter handed to the bucket when fetching a dataset view.
///
/// Exactly one of `steps` / `reports` / `datatypes` is set by the
/// resolver, matching the category the step code resolved to. `pipeline`
/// is the package label and is left unset for masked data, which is not
/// package-scoped.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetFilter {
  pub pipeline: Option<String>,
  pub ext: String,
  pub regex: Option<String>,
  pub steps: Option<String>,
  pub reports: Option<String>,
  pub datatypes: Option<String>,
}

impl Default for DatasetFilter {
  fn default() -> Self {
    Self {
      pipeline: None,
      ext: DEFAULT_EXT.to_string(),
      regex: None,
      steps: None,
      reports: None,
      datatypes: None,
    }
  }
}

/// A read-only, filtered slice of the bucket's index.
#[derive(Debug, Clone)]
pub struct DatasetView {
  pub class: DataClass,
  pub entries: Vec<PathBuf>,
}

impl DatasetView {
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

/// The dataset storage/indexing abstraction.
///
/// Implementations index a dataset on some medium and answer filtered
/// queries against it. The engine only ever asks for refreshes, a human
/// readable summary, and filtered views.
pub trait Bucket: Send + Sync {
  /// Absolute location of the dataset this bucket indexes.
  fn path(&self) -> PathBuf;

  /// Re-scans the underlying medium so later queries see recent output.
  fn update(&self);

  /// Human-readable description of the indexed dataset.
  fn summary(&self) -> String;

  /// Returns the entries of `class` matching `filter`.
  fn fetch(&self, class: DataClass, filter: &DatasetFilter) -> OrchisResult<DatasetView>;
}
