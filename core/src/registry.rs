// orchis/src/registry.rs

//! Defines the `PackageRegistry<Err>`, the index-keyed registry of
//! installed pipeline packages, together with the interface provider the
//! plugin layer supplies.
//!
//! Discovery is explicit: the plugin loading mechanism (external to this
//! core) registers each package it finds, in discovery order. The index
//! -> title mapping is contiguous, zero-based, and stable for the
//! lifetime of a discovery pass.

use crate::bucket::Bucket;
use crate::error::OrchisError;
use crate::interface::{Interface, InterfaceOptions, InterfaceProvider};
use crate::pipeline::definition::PipelinePackage;

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{event, Level};

/// A package addressed either by its discovery index or by its title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageRef {
  Index(usize),
  Title(String),
}

impl From<usize> for PackageRef {
  fn from(idx: usize) -> Self {
    PackageRef::Index(idx)
  }
}

impl From<&str> for PackageRef {
  fn from(title: &str) -> Self {
    PackageRef::Title(title.to_string())
  }
}

impl From<String> for PackageRef {
  fn from(title: String) -> Self {
    PackageRef::Title(title)
  }
}

/// The registry of installed packages plus the provider that builds
/// processing interfaces for selections.
pub struct PackageRegistry<Err = OrchisError>
where
  Err: std::error::Error + From<OrchisError> + Send + Sync + 'static,
{
  packages: RwLock<Vec<Arc<dyn PipelinePackage<Err>>>>,
  provider: Arc<dyn InterfaceProvider>,
}

impl<Err> PackageRegistry<Err>
where
  Err: std::error::Error + From<OrchisError> + Send + Sync + 'static,
{
  /// Creates an empty registry backed by `provider`.
  pub fn new(provider: Arc<dyn InterfaceProvider>) -> Self {
    Self {
      packages: RwLock::new(Vec::new()),
      provider,
    }
  }

  /// Registers a package. Re-registering a title replaces the package in
  /// place, keeping every already-handed-out index stable.
  pub fn register_package(&self, package: Arc<dyn PipelinePackage<Err>>) {
    let title = package.title().to_string();
    event!(Level::DEBUG, %title, "Registering pipeline package.");
    let mut packages = self.packages.write();
    match packages.iter().position(|p| p.title() == title) {
      Some(idx) => packages[idx] = package,
      None => packages.push(package),
    }
  }

  pub fn len(&self) -> usize {
    self.packages.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.packages.read().is_empty()
  }

  /// The `index -> title` view of installed packages.
  pub fn installed(&self) -> BTreeMap<usize, String> {
    self
      .packages
      .read()
      .iter()
      .enumerate()
      .map(|(i, p)| (i, p.title().to_string()))
      .collect()
  }

  pub fn get(&self, id: usize) -> Option<Arc<dyn PipelinePackage<Err>>> {
    self.packages.read().get(id).cloned()
  }

  pub fn by_title(&self, title: &str) -> Option<Arc<dyn PipelinePackage<Err>>> {
    self.packages.read().iter().find(|p| p.title() == title).cloned()
  }

  /// Resolves an index-or-title reference to a package.
  pub fn resolve(&self, package: &PackageRef) -> Option<Arc<dyn PipelinePackage<Err>>> {
    match package {
      PackageRef::Index(idx) => self.get(*idx),
      PackageRef::Title(title) => self.by_title(title),
    }
  }

  /// Builds a processing interface for `title` through the provider.
  pub fn interface(
    &self,
    bucket: Arc<dyn Bucket>,
    title: &str,
    opts: &InterfaceOptions,
  ) -> Arc<dyn Interface> {
    self.provider.interface(bucket, title, opts)
  }
}
