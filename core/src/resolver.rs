// orchis/src/resolver.rs

//! Defines the `DatasetResolver`: category membership for step codes and
//! the query filters built from it.
//!
//! A step code belongs to exactly one of three categories, decided by
//! probing the interface's namespaces in fixed priority order — processed
//! first, then reported, then masked. A code present in more than one
//! namespace silently resolves to the earlier category; a code present in
//! none resolves to "no data", which is an empty result, not a fault.

use crate::bucket::{DataClass, DatasetFilter, StepCode};
use crate::interface::Interface;
use std::sync::Arc;
use tracing::{event, Level};

/// Outcome of a successful category probe.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDataset {
  pub class: DataClass,
  /// Name of the produced step the code addresses, as recorded by the
  /// interface namespace it was found in.
  pub location: String,
}

/// Resolves step codes against one selection's interface.
pub struct DatasetResolver {
  interface: Arc<dyn Interface>,
}

impl DatasetResolver {
  pub fn new(interface: Arc<dyn Interface>) -> Self {
    Self { interface }
  }

  /// Determines which category `code` belongs to.
  pub fn resolve(&self, code: &StepCode) -> Option<ResolvedDataset> {
    // Probe order is the category priority; first hit wins.
    if let Some(location) = self.interface.processed().get(code) {
      return Some(ResolvedDataset {
        class: DataClass::Processed,
        location: location.clone(),
      });
    }
    if let Some(location) = self.interface.reported().get(code) {
      return Some(ResolvedDataset {
        class: DataClass::Reported,
        location: location.clone(),
      });
    }
    if let Some(location) = self.interface.masked().get(code) {
      return Some(ResolvedDataset {
        class: DataClass::Masked,
        location: location.clone(),
      });
    }
    event!(Level::DEBUG, code = %code, "Step code absent from all namespaces.");
    None
  }

  /// Builds the bucket query filter for `code`, or `None` when the code
  /// has no data.
  ///
  /// The filter carries the package label, the file extension, the
  /// optional name-matching pattern, and the one category key matching
  /// the resolved class. Masked data is not package-scoped, so its
  /// filter omits the label.
  pub fn filter_for(
    &self,
    code: &StepCode,
    ext: &str,
    regex: Option<&str>,
  ) -> Option<(DataClass, DatasetFilter)> {
    let resolved = self.resolve(code)?;

    let mut filter = DatasetFilter {
      pipeline: Some(self.interface.label()),
      ext: ext.to_string(),
      regex: regex.map(String::from),
      ..DatasetFilter::default()
    };
    match resolved.class {
      DataClass::Processed => filter.steps = Some(resolved.location),
      DataClass::Reported => filter.reports = Some(resolved.location),
      DataClass::Masked => {
        filter.datatypes = Some(resolved.location);
        filter.pipeline = None;
      }
    }
    Some((resolved.class, filter))
  }
}
