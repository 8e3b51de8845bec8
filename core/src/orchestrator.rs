// orchis/src/orchestrator.rs

//! The top-level façade of the engine: package selection, registry and
//! binder (re)binding, parameter application, step execution, removal of
//! produced data, dataset views, progress tracking, and the summary
//! snapshot.
//!
//! The orchestrator exclusively owns its current `PipelineDefinition` and
//! discards/rebuilds it whenever the selection or its parameters change.
//! The bucket and the package registry are shared, not owned. Rebinding
//! is never partial: every mutating operation builds its replacement
//! state completely before committing it, so a failure leaves the prior
//! selection and parameters unchanged.

use crate::bucket::{Bucket, DatasetView, StepCode, StepCodes, DEFAULT_EXT};
use crate::config::Config;
use crate::core::params::ParamValue;
use crate::core::step::StepContext;
use crate::error::OrchisError;
use crate::interface::{Interface, InterfaceOptions, RemoveMode};
use crate::pipeline::definition::{PipelineBuilder, PipelineDefinition, PipelinePackage};
use crate::progress::{ProgressHandle, ProgressSink, ProgressTracker, TracingSink};
use crate::registry::{PackageRef, PackageRegistry};
use crate::resolver::DatasetResolver;

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{event, instrument, Level};

/// Construction options; anything left `None` falls back to the
/// process-wide `Config`.
#[derive(Debug, Clone, Default)]
pub struct OrchestratorOptions {
  pub logging: Option<bool>,
  pub n_threads: Option<usize>,
  pub verbose: Option<bool>,
}

/// Major user interface to processing pipelines.
///
/// The engine itself contains no interface commands and no pipeline
/// packages; both arrive through the plugin layer, via the
/// `PackageRegistry` handed in at construction.
///
/// `Err` is the application-level error type surfaced by the fallible
/// operations; it must be constructible from `OrchisError` so framework
/// failures (unknown index, malformed code, ...) can be converted.
pub struct Orchestrator<Err = OrchisError>
where
  Err: std::error::Error + From<OrchisError> + Send + Sync + 'static,
{
  bucket: Arc<dyn Bucket>,
  registry: Arc<PackageRegistry<Err>>,

  // Selection state. `title` survives a detach so summaries stay
  // readable; `selected`/`stored_id` are what make a selection live.
  selected: Option<PipelineDefinition<Err>>,
  interface: Option<Arc<dyn Interface>>,
  title: Option<String>,
  stored_id: Option<usize>,

  logging: bool,
  n_threads: usize,
  verbose: bool,
}

impl<Err> Orchestrator<Err>
where
  Err: std::error::Error + From<OrchisError> + Send + Sync + 'static,
{
  /// Creates an orchestrator over `bucket` with configuration defaults.
  pub fn new(bucket: Arc<dyn Bucket>, registry: Arc<PackageRegistry<Err>>) -> Self {
    Self::with_options(bucket, registry, OrchestratorOptions::default())
  }

  /// Creates an orchestrator with explicit options; unset fields fall
  /// back to the process-wide configuration.
  pub fn with_options(
    bucket: Arc<dyn Bucket>,
    registry: Arc<PackageRegistry<Err>>,
    options: OrchestratorOptions,
  ) -> Self {
    let cfg = Config::global();
    let orchestrator = Self {
      bucket,
      registry,
      selected: None,
      interface: None,
      title: None,
      stored_id: None,
      logging: options.logging.unwrap_or(cfg.logging),
      n_threads: options.n_threads.unwrap_or(cfg.n_threads),
      verbose: options.verbose.unwrap_or(cfg.verbose),
    };

    if orchestrator.verbose {
      event!(Level::INFO, summary = %orchestrator.bucket.summary(), "Dataset bucket attached.");
      let avails: Vec<String> = orchestrator
        .installed_packages()
        .iter()
        .map(|(idx, title)| format!("\t{} : {}", idx, title))
        .collect();
      event!(
        Level::INFO,
        packages = %avails.join("\n"),
        "List of installed pipeline packages."
      );
    }
    orchestrator
  }

  // --- Read-only surface ---

  /// The `index -> title` mapping of installed packages.
  pub fn installed_packages(&self) -> BTreeMap<usize, String> {
    self.registry.installed()
  }

  /// The currently bound definition, if a package is selected.
  pub fn selected(&self) -> Option<&PipelineDefinition<Err>> {
    self.selected.as_ref()
  }

  /// The `index -> pipeline name` mapping of the selected package.
  pub fn installed_pipelines(&self) -> Option<BTreeMap<usize, String>> {
    self.selected.as_ref().map(|def| def.installed_pipelines())
  }

  pub fn bucket(&self) -> &Arc<dyn Bucket> {
    &self.bucket
  }

  pub fn interface(&self) -> Option<&Arc<dyn Interface>> {
    self.interface.as_ref()
  }

  /// Scheduler handles per running step name.
  pub fn schedulers(&self) -> BTreeMap<String, Vec<String>> {
    match self.interface.as_ref() {
      Some(interface) => interface
        .running()
        .into_iter()
        .map(|(step, workers)| (step, workers.schedulers))
        .collect(),
      None => BTreeMap::new(),
    }
  }

  /// Manager handles per running step name.
  pub fn managers(&self) -> BTreeMap<String, Vec<String>> {
    match self.interface.as_ref() {
      Some(interface) => interface
        .running()
        .into_iter()
        .map(|(step, workers)| (step, workers.managers))
        .collect(),
      None => BTreeMap::new(),
    }
  }

  /// Help text of a discovered package, addressed by index or title.
  pub fn howto(&self, package: impl Into<PackageRef>) -> Option<String> {
    self.registry.resolve(&package.into()).map(|p| p.doc().to_string())
  }

  // --- Selection ---

  /// Detaches the selected pipeline package.
  pub fn detach_package(&mut self) {
    self.selected = None;
    self.stored_id = None;
  }

  /// Selects the package at `id` in the installed mapping, rebinds, and
  /// applies `params` as initial configuration.
  #[instrument(name = "Orchestrator::set_package", skip(self, params), fields(package_id = id), err(Display))]
  pub fn set_package(&mut self, id: usize, params: &[(&str, ParamValue)]) -> Result<(), Err> {
    self.bucket.update();

    let package = self
      .registry
      .get(id)
      .ok_or_else(|| Err::from(OrchisError::InvalidPackageIdentifier { id }))?;
    let title = package.title().to_string();

    let (interface, definition) = self.rebind(&title, Some(&package), params)?;

    // Commit only after the whole rebind succeeded.
    self.stored_id = Some(id);
    self.title = Some(title.clone());
    self.interface = Some(interface);
    self.selected = Some(definition);

    if self.verbose {
      event!(Level::INFO, doc = %package.doc(), "Description of this package.");
      let avails: Vec<String> = self
        .installed_pipelines()
        .unwrap_or_default()
        .iter()
        .map(|(idx, name)| format!("\t{} : {}", idx, name))
        .collect();
      event!(
        Level::INFO,
        package = %title,
        pipelines = %avails.join("\n"),
        "Package selected; double check the parameters before running."
      );
    }
    Ok(())
  }

  /// Initiates an empty, unregistered package under `title`: a selection
  /// with no steps and no parameters, bound directly to the given title
  /// without consulting the installed mapping.
  pub fn set_empty_package(&mut self, title: &str) -> Result<(), Err> {
    self.bucket.update();
    self.detach_package();

    let (interface, definition) = self.rebind(title, None, &[])?;
    self.title = Some(title.to_string());
    self.interface = Some(interface);
    self.selected = Some(definition);

    if self.verbose {
      event!(Level::INFO, %title, "Temporary pipeline package initiated.");
    }
    Ok(())
  }

  /// Rebuilds the interface, step registry and parameter binder from the
  /// current selection and applies `params` as initial configuration.
  /// No-op when nothing is selected.
  pub fn reset(&mut self, params: &[(&str, ParamValue)]) -> Result<(), Err> {
    if self.selected.is_none() && self.stored_id.is_none() {
      return Ok(());
    }
    let title = match &self.title {
      Some(title) => title.clone(),
      None => return Ok(()),
    };

    let package = match self.stored_id {
      Some(id) => Some(
        self
          .registry
          .get(id)
          .ok_or_else(|| Err::from(OrchisError::InvalidPackageIdentifier { id }))?,
      ),
      // Ad-hoc selection: rebind the empty registry/binder pair.
      None => None,
    };

    let (interface, definition) = self.rebind(&title, package.as_ref(), params)?;
    self.interface = Some(interface);
    self.selected = Some(definition);
    Ok(())
  }

  fn interface_options(&self) -> InterfaceOptions {
    InterfaceOptions {
      logging: self.logging,
      n_threads: self.n_threads,
    }
  }

  /// Builds the replacement interface/definition pair for `title`
  /// without touching current state; callers commit on success.
  fn rebind(
    &self,
    title: &str,
    package: Option<&Arc<dyn PipelinePackage<Err>>>,
    params: &[(&str, ParamValue)],
  ) -> Result<(Arc<dyn Interface>, PipelineDefinition<Err>), Err> {
    let interface =
      self
        .registry
        .interface(Arc::clone(&self.bucket), title, &self.interface_options());

    let mut definition = match package {
      Some(pkg) => {
        let mut builder = PipelineBuilder::new(title);
        pkg.bind(&mut builder).map_err(|source| {
          Err::from(OrchisError::BindFailure {
            package: title.to_string(),
            source,
          })
        })?;
        builder.finish()
      }
      None => PipelineDefinition::empty(title),
    };

    definition.params_mut().apply(params).map_err(Err::from)?;
    Ok((interface, definition))
  }

  // --- Parameters ---

  /// Sets declared parameters on the active definition.
  pub fn set_param(&mut self, params: &[(&str, ParamValue)]) -> Result<(), Err> {
    match self.selected.as_mut() {
      Some(definition) => definition.params_mut().apply(params).map_err(Err::from),
      None => Err(Err::from(OrchisError::NoPackageSelected)),
    }
  }

  /// The current configuration of the active definition, or `None` when
  /// nothing is selected.
  pub fn get_param(&self) -> Option<BTreeMap<String, ParamValue>> {
    self.selected.as_ref().map(|definition| definition.params().get_all())
  }

  // --- Execution ---

  /// Executes the step at `index` in the selected package.
  ///
  /// Always re-binds first, so the step sees the package defaults plus
  /// whatever `params` carry for this run. Blocks (awaits) for the full
  /// duration of the delegated plugin work.
  #[instrument(name = "Orchestrator::run", skip(self, params), fields(step_index = index), err(Display))]
  pub async fn run(&mut self, index: usize, params: &[(&str, ParamValue)]) -> Result<(), Err> {
    if self.selected.is_none() {
      return Err(Err::from(OrchisError::NoPackageSelected));
    }
    self.reset(&[])?;
    self.set_param(params)?;

    let definition = match self.selected.as_ref() {
      Some(definition) => definition,
      None => return Err(Err::from(OrchisError::NoPackageSelected)),
    };
    let interface = match self.interface.as_ref() {
      Some(interface) => Arc::clone(interface),
      None => {
        return Err(Err::from(OrchisError::Internal(
          "selection has no processing interface bound".to_string(),
        )))
      }
    };

    if self.verbose {
      if let Some(def) = definition.steps().get(index) {
        event!(Level::INFO, step = %def.name, doc = %def.doc, "Running pipeline step.");
      }
    }

    let ctx = StepContext::new(
      Arc::clone(&self.bucket),
      interface,
      definition.params().get_all(),
    );
    definition.steps().invoke(index, ctx).await
  }

  // --- Produced data ---

  /// Destroys previously produced data for one or several step codes.
  ///
  /// The whole input is validated before anything is destroyed; one
  /// malformed code fails the call with `MalformedStepCode` and leaves
  /// every step untouched.
  pub fn remove(&self, codes: impl Into<StepCodes>, mode: RemoveMode) -> Result<(), Err> {
    let codes = codes.into().validate().map_err(Err::from)?;
    let interface = self
      .interface
      .as_ref()
      .ok_or_else(|| Err::from(OrchisError::NoPackageSelected))?;

    for code in &codes {
      event!(Level::DEBUG, code = %code, %mode, "Destroying produced step data.");
      interface.destroy_step(code, mode).map_err(Err::from)?;
    }
    Ok(())
  }

  /// A filtered view of the data a step code produced, or `Ok(None)`
  /// when the code is absent from all three namespaces ("no data") or
  /// nothing is selected.
  pub fn get_dset(
    &self,
    code: &str,
    ext: Option<&str>,
    regex: Option<&str>,
  ) -> Result<Option<DatasetView>, Err> {
    let interface = match self.interface.as_ref() {
      Some(interface) => interface,
      None => return Ok(None),
    };
    let code = StepCode::new(code).map_err(Err::from)?;

    interface.update();
    let resolver = DatasetResolver::new(Arc::clone(interface));
    match resolver.filter_for(&code, ext.unwrap_or(DEFAULT_EXT), regex) {
      Some((class, filter)) => {
        let view = self
          .bucket
          .fetch(class, &filter)
          .map_err(Err::from)?;
        Ok(Some(view))
      }
      None => Ok(None),
    }
  }

  // --- Progress ---

  /// Starts a progress tracker over the active selection's counters,
  /// reporting through INFO events. No-op (`None`) when unselected.
  pub fn check_progression(&self) -> Option<ProgressHandle> {
    self.check_progression_with(Arc::new(TracingSink))
  }

  /// Starts a progress tracker pushing to a caller-supplied sink.
  pub fn check_progression_with(&self, sink: Arc<dyn ProgressSink>) -> Option<ProgressHandle> {
    let interface = self.interface.as_ref()?;
    let desc = self
      .stored_id
      .and_then(|id| self.installed_packages().get(&id).cloned())
      .or_else(|| self.title.clone())
      .unwrap_or_else(|| interface.label());
    Some(ProgressTracker::spawn(interface.counters(), sink, desc))
  }

  // --- Summary ---

  /// Read-only text snapshot of the current selection's produced and
  /// queued steps.
  pub fn summary(&self) -> String {
    match self.render_summary() {
      Some(text) => text,
      None => "No pipeline package selected.".to_string(),
    }
  }

  fn render_summary(&self) -> Option<String> {
    let title = self.title.as_ref()?;
    let interface = self.interface.as_ref()?;
    interface.update();

    let mut s = vec![format!(
      "** List of existing steps in selected package [{}]:\n",
      title
    )];

    let processed = interface.processed();
    if !processed.is_empty() {
      s.push("- Processed steps:".to_string());
      for (code, step) in &processed {
        s.push(format!("\t{}: {}", code, step));
      }
    }
    let reported = interface.reported();
    if !reported.is_empty() {
      s.push("- Reported steps:".to_string());
      for (code, step) in &reported {
        s.push(format!("\t{}: {}", code, step));
      }
    }
    let masked = interface.masked();
    if !masked.is_empty() {
      s.push("- Mask data:".to_string());
      for (code, step) in &masked {
        s.push(format!("\t{}: {}", code, step));
      }
    }
    let waiting = interface.waiting();
    if !waiting.is_empty() {
      s.push("- Queue:".to_string());
      s.push(format!("\t{}", waiting.join(", ")));
    }
    Some(s.join("\n"))
  }
}

impl<Err> std::fmt::Display for Orchestrator<Err>
where
  Err: std::error::Error + From<OrchisError> + Send + Sync + 'static,
{
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.summary())
  }
}

impl Orchestrator<OrchisError> {
  pub fn new_default(
    bucket: Arc<dyn Bucket>,
    registry: Arc<PackageRegistry<OrchisError>>,
  ) -> Self {
    Orchestrator::<OrchisError>::new(bucket, registry)
  }
}
