// orchis/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchisError {
  #[error("Invalid package identifier: {id} is not an index into the installed package mapping")]
  InvalidPackageIdentifier { id: usize },

  #[error("Unknown parameter '{name}' for package '{package}'")]
  UnknownParameterName { name: String, package: String },

  #[error("No pipeline package is selected")]
  NoPackageSelected,

  #[error("Unknown step index {index}: package '{package}' registers {count} step(s)")]
  UnknownStepIndex {
    index: usize,
    package: String,
    count: usize,
  },

  #[error("Malformed step code '{code}': a step code is exactly 3 characters")]
  MalformedStepCode { code: String },

  #[error("Step '{step_name}' failed. Source: {source}")]
  StepFailure {
    step_name: String,
    #[source]
    source: AnyhowError,
  },

  #[error("Package '{package}' failed to bind. Source: {source}")]
  BindFailure {
    package: String,
    #[source]
    source: AnyhowError,
  },

  #[error("Storage operation '{operation}' failed. Source: {source}")]
  StorageFailure {
    operation: String,
    #[source]
    source: AnyhowError,
  },

  #[error("Internal Orchis error: {0}")]
  Internal(String),
}

// This is the key conversion Orchis provides for external errors. Anything a
// plugin or collaborator surfaces through anyhow lands in StepFailure; the
// step name is filled in by the invocation path when it has one.
impl From<AnyhowError> for OrchisError {
  fn from(err: AnyhowError) -> Self {
    OrchisError::StepFailure {
      step_name: "<plugin>".to_string(),
      source: err,
    }
  }
}

pub type OrchisResult<T, E = OrchisError> = std::result::Result<T, E>;
