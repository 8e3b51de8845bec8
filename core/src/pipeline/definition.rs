// orchis/src/pipeline/definition.rs

//! Contains the `PipelinePackage` trait plugin packages implement, the
//! `PipelineBuilder` they register themselves into, and the resulting
//! `PipelineDefinition` / `StepRegistry` owned by the orchestrator.

use crate::core::params::ParamValue;
use crate::core::step::{FnStepRunner, StepContext, StepDef, StepRunner};
use crate::error::OrchisError;
use crate::pipeline::binder::ParameterBinder;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

/// A discovered, pluggable bundle exposing one titled pipeline definition.
///
/// Packages register their steps and declare their parameters explicitly
/// through the builder handed to `bind` — a step exists because the
/// package registered it, never because of how something is named.
/// `bind` is called on every selection and reset, so it must be cheap and
/// repeatable.
pub trait PipelinePackage<Err = OrchisError>: Send + Sync
where
  Err: std::error::Error + From<OrchisError> + Send + Sync + 'static,
{
  /// Stable title of the pipeline this package provides.
  fn title(&self) -> &str;

  /// Help text shown by `Orchestrator::howto`.
  fn doc(&self) -> &str;

  /// Registers steps and declares parameters on `builder`.
  /// A failure here surfaces to the caller as `BindFailure`.
  fn bind(&self, builder: &mut PipelineBuilder<Err>) -> anyhow::Result<()>;
}

/// Ordered mapping `index -> step` for one bound package.
///
/// Indices are assigned in registration order, zero-based and contiguous.
pub struct StepRegistry<Err>
where
  Err: std::error::Error + From<OrchisError> + Send + Sync + 'static,
{
  pub(crate) package: String,
  pub(crate) steps: Vec<StepDef<Err>>,
}

impl<Err> StepRegistry<Err>
where
  Err: std::error::Error + From<OrchisError> + Send + Sync + 'static,
{
  pub(crate) fn new(package: &str) -> Self {
    Self {
      package: package.to_string(),
      steps: Vec::new(),
    }
  }

  pub(crate) fn push(&mut self, def: StepDef<Err>) {
    if self.steps.iter().any(|s| s.name == def.name) {
      // A programming error in the package, not a runtime failure.
      panic!(
        "Orchis setup error: step '{}' registered twice in package '{}'.",
        def.name, self.package
      );
    }
    self.steps.push(def);
  }

  /// Title of the package this registry was bound from.
  pub fn package(&self) -> &str {
    &self.package
  }

  pub fn len(&self) -> usize {
    self.steps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }

  pub fn get(&self, index: usize) -> Option<&StepDef<Err>> {
    self.steps.get(index)
  }

  pub fn index_of(&self, name: &str) -> Option<usize> {
    self.steps.iter().position(|s| s.name == name)
  }

  /// The `index -> step name` view exposed to callers.
  pub fn names(&self) -> BTreeMap<usize, String> {
    self
      .steps
      .iter()
      .enumerate()
      .map(|(i, s)| (i, s.name.clone()))
      .collect()
  }
}

impl<Err> std::fmt::Debug for StepRegistry<Err>
where
  Err: std::error::Error + From<OrchisError> + Send + Sync + 'static,
{
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StepRegistry")
      .field("package", &self.package)
      .field("steps", &self.steps)
      .finish()
  }
}

/// Registration surface handed to `PipelinePackage::bind`.
pub struct PipelineBuilder<Err>
where
  Err: std::error::Error + From<OrchisError> + Send + Sync + 'static,
{
  title: String,
  steps: StepRegistry<Err>,
  params: ParameterBinder,
}

impl<Err> PipelineBuilder<Err>
where
  Err: std::error::Error + From<OrchisError> + Send + Sync + 'static,
{
  pub(crate) fn new(title: &str) -> Self {
    Self {
      title: title.to_string(),
      steps: StepRegistry::new(title),
      params: ParameterBinder::new(title),
    }
  }

  pub fn title(&self) -> &str {
    &self.title
  }

  /// Registers the next step. Its index is the registration position.
  pub fn step(&mut self, name: &str, doc: &str, runner: Arc<dyn StepRunner<Err>>) -> &mut Self {
    self.steps.push(StepDef {
      name: name.to_string(),
      doc: doc.to_string(),
      runner,
    });
    self
  }

  /// Registers the next step from an async closure.
  pub fn step_fn<F, Fut>(&mut self, name: &str, doc: &str, f: F) -> &mut Self
  where
    F: Fn(StepContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), Err>> + Send + 'static,
  {
    self.step(name, doc, Arc::new(FnStepRunner::new(f)))
  }

  /// Declares a configurable parameter with its default value.
  /// Only declared names can later be set through the binder.
  pub fn param(&mut self, name: &str, default: impl Into<ParamValue>) -> &mut Self {
    self.params.declare(name, default.into());
    self
  }

  pub(crate) fn finish(self) -> PipelineDefinition<Err> {
    PipelineDefinition {
      title: self.title,
      steps: self.steps,
      params: self.params,
    }
  }
}

/// A package bound to a title: its step registry plus parameter binder.
///
/// Owned exclusively by the orchestrator and rebuilt on every reset; it
/// never outlives the selection it was bound for.
pub struct PipelineDefinition<Err>
where
  Err: std::error::Error + From<OrchisError> + Send + Sync + 'static,
{
  title: String,
  steps: StepRegistry<Err>,
  params: ParameterBinder,
}

impl<Err> PipelineDefinition<Err>
where
  Err: std::error::Error + From<OrchisError> + Send + Sync + 'static,
{
  /// A definition with no steps and no parameters, for ad-hoc titles
  /// selected without a discovered package.
  pub(crate) fn empty(title: &str) -> Self {
    PipelineBuilder::new(title).finish()
  }

  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn steps(&self) -> &StepRegistry<Err> {
    &self.steps
  }

  pub fn params(&self) -> &ParameterBinder {
    &self.params
  }

  pub(crate) fn params_mut(&mut self) -> &mut ParameterBinder {
    &mut self.params
  }

  /// The `index -> pipeline name` mapping of this package.
  pub fn installed_pipelines(&self) -> BTreeMap<usize, String> {
    self.steps.names()
  }
}

impl<Err> std::fmt::Debug for PipelineDefinition<Err>
where
  Err: std::error::Error + From<OrchisError> + Send + Sync + 'static,
{
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("PipelineDefinition")
      .field("title", &self.title)
      .field("steps", &self.steps)
      .field("params", &self.params)
      .finish()
  }
}
