// orchis/src/pipeline/binder.rs

//! Contains the `ParameterBinder`: get/set access to the parameters a
//! package declared at bind time.
//!
//! The binder is an explicit name -> value table. A name can be set iff
//! the package declared it — there is no ad-hoc creation of parameters,
//! and step entries or engine internals can never be reached through it
//! because they are simply not part of the table.

use crate::core::params::ParamValue;
use crate::error::{OrchisError, OrchisResult};
use std::collections::BTreeMap;
use tracing::{event, Level};

#[derive(Debug, Clone)]
pub struct ParameterBinder {
  package: String,
  values: BTreeMap<String, ParamValue>,
}

impl ParameterBinder {
  pub(crate) fn new(package: &str) -> Self {
    Self {
      package: package.to_string(),
      values: BTreeMap::new(),
    }
  }

  /// Declares `name` with its default. Called by the builder during bind;
  /// re-declaring a name replaces its default.
  pub(crate) fn declare(&mut self, name: &str, default: ParamValue) {
    self.values.insert(name.to_string(), default);
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  pub fn get(&self, name: &str) -> Option<&ParamValue> {
    self.values.get(name)
  }

  /// The current value of every declared parameter.
  pub fn get_all(&self) -> BTreeMap<String, ParamValue> {
    self.values.clone()
  }

  /// Sets a declared parameter. Fails with `UnknownParameterName` if the
  /// package never declared `name`.
  pub fn set(&mut self, name: &str, value: impl Into<ParamValue>) -> OrchisResult<()> {
    match self.values.get_mut(name) {
      Some(slot) => {
        *slot = value.into();
        event!(Level::TRACE, package = %self.package, param = %name, "Parameter updated.");
        Ok(())
      }
      None => Err(OrchisError::UnknownParameterName {
        name: name.to_string(),
        package: self.package.clone(),
      }),
    }
  }

  /// Applies several updates at once. Every name is validated before any
  /// value is written, so a failed apply leaves the table untouched.
  pub fn apply(&mut self, params: &[(&str, ParamValue)]) -> OrchisResult<()> {
    for (name, _) in params {
      if !self.values.contains_key(*name) {
        return Err(OrchisError::UnknownParameterName {
          name: name.to_string(),
          package: self.package.clone(),
        });
      }
    }
    for (name, value) in params {
      self.values.insert(name.to_string(), value.clone());
    }
    Ok(())
  }
}
