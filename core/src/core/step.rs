// orchis/src/core/step.rs

//! Defines the structure of a single registered step and the runner
//! boundary that plugin packages implement.

use crate::bucket::Bucket;
use crate::core::params::ParamValue;
use crate::interface::Interface;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Everything a step runner gets to see when it is invoked: the shared
/// storage collaborators and a snapshot of the bound parameters.
///
/// The snapshot is taken at invocation time, after run-scoped parameters
/// have been applied, so a runner never observes a half-updated table.
#[derive(Clone)]
pub struct StepContext {
  bucket: Arc<dyn Bucket>,
  interface: Arc<dyn Interface>,
  params: BTreeMap<String, ParamValue>,
}

impl StepContext {
  pub fn new(
    bucket: Arc<dyn Bucket>,
    interface: Arc<dyn Interface>,
    params: BTreeMap<String, ParamValue>,
  ) -> Self {
    Self {
      bucket,
      interface,
      params,
    }
  }

  pub fn bucket(&self) -> &Arc<dyn Bucket> {
    &self.bucket
  }

  pub fn interface(&self) -> &Arc<dyn Interface> {
    &self.interface
  }

  /// Looks up a declared parameter by name.
  pub fn param(&self, name: &str) -> Option<&ParamValue> {
    self.params.get(name)
  }

  pub fn params(&self) -> &BTreeMap<String, ParamValue> {
    &self.params
  }
}

impl std::fmt::Debug for StepContext {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StepContext")
      .field("interface_label", &self.interface.label())
      .field("params", &self.params)
      .finish()
  }
}

/// The unit of work a package registers for a step.
///
/// A runner delegates entirely to plugin code; the engine never inspects
/// what it does. Runners are expected to mutate the storage collaborator
/// (submit jobs, write outputs) as their means of producing results.
#[async_trait]
pub trait StepRunner<Err>: Send + Sync
where
  Err: std::error::Error + Send + Sync + 'static,
{
  async fn run(&self, ctx: StepContext) -> Result<(), Err>;
}

/// Adapter so plain async closures can be registered as step runners.
pub struct FnStepRunner<Err> {
  f: Arc<dyn Fn(StepContext) -> Pin<Box<dyn Future<Output = Result<(), Err>> + Send>> + Send + Sync>,
}

impl<Err> FnStepRunner<Err>
where
  Err: std::error::Error + Send + Sync + 'static,
{
  pub fn new<F, Fut>(f: F) -> Self
  where
    F: Fn(StepContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), Err>> + Send + 'static,
  {
    Self {
      f: Arc::new(move |ctx| Box::pin(f(ctx))),
    }
  }
}

#[async_trait]
impl<Err> StepRunner<Err> for FnStepRunner<Err>
where
  Err: std::error::Error + Send + Sync + 'static,
{
  async fn run(&self, ctx: StepContext) -> Result<(), Err> {
    (self.f)(ctx).await
  }
}

/// Definition of a registered step: display name, help text, runner.
///
/// Indices are not stored here; a step's index is its position in the
/// registry that owns it (registration order, zero-based, contiguous).
pub struct StepDef<Err>
where
  Err: std::error::Error + Send + Sync + 'static,
{
  pub name: String,
  pub doc: String,
  pub(crate) runner: Arc<dyn StepRunner<Err>>,
}

impl<Err> Clone for StepDef<Err>
where
  Err: std::error::Error + Send + Sync + 'static,
{
  fn clone(&self) -> Self {
    Self {
      name: self.name.clone(),
      doc: self.doc.clone(),
      runner: Arc::clone(&self.runner),
    }
  }
}

// Manual Debug: the runner is an opaque trait object.
impl<Err> std::fmt::Debug for StepDef<Err>
where
  Err: std::error::Error + Send + Sync + 'static,
{
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StepDef")
      .field("name", &self.name)
      .field("has_doc", &!self.doc.is_empty())
      .finish()
  }
}
