// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use orchis::{
  Bucket, DataClass, DatasetFilter, DatasetView, Interface, InterfaceOptions, InterfaceProvider,
  JobCounters, OrchisError, ParamValue, PipelineBuilder, PipelinePackage, ProgressSink,
  RemoveMode, StepCode, StepContext, StepWorkers,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use tracing::Level;

// --- Common Error Type for Tests ---
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)] // Clone, PartialEq, Eq for assertions
pub enum TestError {
  #[error("Orchis framework error: {0}")] // Stored as String for Eq comparison
  Orchis(String),

  #[error("Test step failed: {0}")]
  Step(String),
}

impl From<OrchisError> for TestError {
  fn from(oe: OrchisError) -> Self {
    // Simple conversion for testing; good enough for Eq assertions.
    TestError::Orchis(format!("{:?}", oe))
  }
}

// --- In-memory Bucket collaborator ---

/// Minimal storage collaborator: an indexed list of (class, location, path)
/// entries plus a record of the filters it was queried with.
pub struct MemoryBucket {
  root: PathBuf,
  update_count: AtomicUsize,
  entries: Mutex<Vec<(DataClass, String, PathBuf)>>,
  pub last_filter: Mutex<Option<(DataClass, DatasetFilter)>>,
}

impl MemoryBucket {
  pub fn new(root: &str) -> Arc<Self> {
    Arc::new(Self {
      root: PathBuf::from(root),
      update_count: AtomicUsize::new(0),
      entries: Mutex::new(Vec::new()),
      last_filter: Mutex::new(None),
    })
  }

  /// Seeds an indexed entry under (class, location).
  pub fn seed(&self, class: DataClass, location: &str, path: &str) {
    self
      .entries
      .lock()
      .push((class, location.to_string(), PathBuf::from(path)));
  }

  pub fn update_count(&self) -> usize {
    self.update_count.load(Ordering::SeqCst)
  }
}

impl Bucket for MemoryBucket {
  fn path(&self) -> PathBuf {
    self.root.clone()
  }

  fn update(&self) {
    self.update_count.fetch_add(1, Ordering::SeqCst);
  }

  fn summary(&self) -> String {
    format!("memory dataset at {}", self.root.display())
  }

  fn fetch(&self, class: DataClass, filter: &DatasetFilter) -> Result<DatasetView, OrchisError> {
    *self.last_filter.lock() = Some((class, filter.clone()));
    let location = filter
      .steps
      .as_deref()
      .or(filter.reports.as_deref())
      .or(filter.datatypes.as_deref())
      .unwrap_or("")
      .to_string();
    let entries = self
      .entries
      .lock()
      .iter()
      .filter(|(c, loc, _)| *c == class && *loc == location)
      .map(|(_, _, p)| p.clone())
      .collect();
    Ok(DatasetView { class, entries })
  }
}

// --- In-memory Interface collaborator ---

#[derive(Default)]
struct InterfaceState {
  processed: BTreeMap<StepCode, String>,
  reported: BTreeMap<StepCode, String>,
  masked: BTreeMap<StepCode, String>,
  waiting: Vec<String>,
  running: BTreeMap<String, StepWorkers>,
  destroyed: Vec<(StepCode, RemoveMode)>,
}

/// Processing interface owning the produced-data namespaces and the job
/// counters, the way the real plugin-supplied interface would.
pub struct MemoryInterface {
  label: String,
  state: Mutex<InterfaceState>,
  counters: Arc<JobCounters>,
  update_count: AtomicUsize,
}

impl MemoryInterface {
  pub fn new(label: &str) -> Self {
    Self {
      label: label.to_string(),
      state: Mutex::new(InterfaceState::default()),
      counters: Arc::new(JobCounters::new()),
      update_count: AtomicUsize::new(0),
    }
  }

  pub fn mark_processed(&self, code: &str, step: &str) {
    let code = StepCode::new(code).unwrap();
    self.state.lock().processed.insert(code, step.to_string());
  }

  pub fn mark_reported(&self, code: &str, step: &str) {
    let code = StepCode::new(code).unwrap();
    self.state.lock().reported.insert(code, step.to_string());
  }

  pub fn mark_masked(&self, code: &str, step: &str) {
    let code = StepCode::new(code).unwrap();
    self.state.lock().masked.insert(code, step.to_string());
  }

  pub fn push_waiting(&self, step: &str) {
    self.state.lock().waiting.push(step.to_string());
  }

  pub fn set_running(&self, step: &str, workers: StepWorkers) {
    self.state.lock().running.insert(step.to_string(), workers);
  }

  pub fn destroyed(&self) -> Vec<(StepCode, RemoveMode)> {
    self.state.lock().destroyed.clone()
  }

  pub fn update_count(&self) -> usize {
    self.update_count.load(Ordering::SeqCst)
  }
}

impl Interface for MemoryInterface {
  fn label(&self) -> String {
    self.label.clone()
  }

  fn update(&self) {
    self.update_count.fetch_add(1, Ordering::SeqCst);
  }

  fn processed(&self) -> BTreeMap<StepCode, String> {
    self.state.lock().processed.clone()
  }

  fn reported(&self) -> BTreeMap<StepCode, String> {
    self.state.lock().reported.clone()
  }

  fn masked(&self) -> BTreeMap<StepCode, String> {
    self.state.lock().masked.clone()
  }

  fn waiting(&self) -> Vec<String> {
    self.state.lock().waiting.clone()
  }

  fn counters(&self) -> Arc<JobCounters> {
    Arc::clone(&self.counters)
  }

  fn running(&self) -> BTreeMap<String, StepWorkers> {
    self.state.lock().running.clone()
  }

  fn destroy_step(&self, code: &StepCode, mode: RemoveMode) -> Result<(), OrchisError> {
    let mut state = self.state.lock();
    state.processed.remove(code);
    state.reported.remove(code);
    state.masked.remove(code);
    state.destroyed.push((code.clone(), mode));
    Ok(())
  }
}

/// Provider that hands out one stable `MemoryInterface` per title, so
/// produced-data state survives rebinds the way real storage would.
#[derive(Default)]
pub struct TestProvider {
  made: Mutex<BTreeMap<String, Arc<MemoryInterface>>>,
  build_count: AtomicUsize,
}

impl TestProvider {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  /// The interface bound for `title`, creating it if needed.
  pub fn interface_for(&self, title: &str) -> Arc<MemoryInterface> {
    Arc::clone(
      self
        .made
        .lock()
        .entry(title.to_string())
        .or_insert_with(|| Arc::new(MemoryInterface::new(title))),
    )
  }

  pub fn build_count(&self) -> usize {
    self.build_count.load(Ordering::SeqCst)
  }
}

impl InterfaceProvider for TestProvider {
  fn interface(
    &self,
    _bucket: Arc<dyn Bucket>,
    title: &str,
    _opts: &InterfaceOptions,
  ) -> Arc<dyn Interface> {
    self.build_count.fetch_add(1, Ordering::SeqCst);
    self.interface_for(title)
  }
}

// --- A denoising package in the shape real plugins take ---

/// Package titled `T1proc` with a single `denoise` step and a handful of
/// declared parameters. The step produces its output by marking the
/// interface namespace, the way a plugin's processing commands would.
pub struct DenoisePackage {
  provider: Arc<TestProvider>,
  exec_count: Arc<AtomicUsize>,
}

impl DenoisePackage {
  pub fn new(provider: Arc<TestProvider>) -> Self {
    Self {
      provider,
      exec_count: Arc::new(AtomicUsize::new(0)),
    }
  }

  pub fn exec_count(&self) -> Arc<AtomicUsize> {
    Arc::clone(&self.exec_count)
  }
}

impl PipelinePackage for DenoisePackage {
  fn title(&self) -> &str {
    "T1proc"
  }

  fn doc(&self) -> &str {
    "Structural preprocessing package.\n\
     Keyword Args:\n\
       tr(int):        repetition time of the input data\n\
       tpattern(str):  slice acquisition order\n\
       fwhm(float):    smoothing kernel width\n\
       mask_path(str): optional brain mask"
  }

  fn bind(&self, builder: &mut PipelineBuilder<OrchisError>) -> anyhow::Result<()> {
    builder
      .param("tr", 2)
      .param("tpattern", "altplus")
      .param("fwhm", 0.5)
      .param("mask_path", ParamValue::None);

    let provider = Arc::clone(&self.provider);
    let execs = Arc::clone(&self.exec_count);
    builder.step_fn(
      "denoise",
      "Removes scanner noise from the functional images.",
      move |ctx: StepContext| {
        let provider = Arc::clone(&provider);
        let execs = Arc::clone(&execs);
        async move {
          execs.fetch_add(1, Ordering::SeqCst);
          let interface = provider.interface_for(&ctx.interface().label());
          interface.mark_processed("010", "denoise");
          Ok::<(), OrchisError>(())
        }
      },
    );
    Ok(())
  }
}

/// Package whose `bind` fails, for BindFailure propagation tests.
pub struct BrokenPackage;

impl PipelinePackage for BrokenPackage {
  fn title(&self) -> &str {
    "Broken"
  }

  fn doc(&self) -> &str {
    "Always fails to bind."
  }

  fn bind(&self, _builder: &mut PipelineBuilder<OrchisError>) -> anyhow::Result<()> {
    Err(anyhow::anyhow!("missing plugin resources"))
  }
}

// --- Progress sink that records what it is driven with ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
  Begin { total: usize, finished: usize, desc: String },
  Advance { delta: usize },
  Finish,
}

#[derive(Default)]
pub struct RecordingSink {
  events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  pub fn events(&self) -> Vec<SinkEvent> {
    self.events.lock().clone()
  }
}

impl ProgressSink for RecordingSink {
  fn begin(&self, total: usize, finished: usize, desc: &str) {
    self.events.lock().push(SinkEvent::Begin {
      total,
      finished,
      desc: desc.to_string(),
    });
  }

  fn advance(&self, delta: usize) {
    self.events.lock().push(SinkEvent::Advance { delta });
  }

  fn finish(&self) {
    self.events.lock().push(SinkEvent::Finish);
  }
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
