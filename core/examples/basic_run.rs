// orchis/examples/basic_run.rs

use orchis::{
  Bucket, DataClass, DatasetFilter, DatasetView, Interface, InterfaceOptions, InterfaceProvider,
  JobCounters, OrchisError, Orchestrator, PackageRegistry, ParamValue, PipelineBuilder,
  PipelinePackage, StepCode, StepContext, StepWorkers,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

// 1. A toy storage collaborator. Real deployments index a dataset on disk;
//    this one just answers with the paths it was told about.
struct ToyBucket;

impl Bucket for ToyBucket {
  fn path(&self) -> PathBuf {
    PathBuf::from("/project/dataset")
  }

  fn update(&self) {}

  fn summary(&self) -> String {
    "toy dataset (1 subject)".to_string()
  }

  fn fetch(&self, class: DataClass, filter: &DatasetFilter) -> Result<DatasetView, OrchisError> {
    let location = filter.steps.clone().unwrap_or_default();
    Ok(DatasetView {
      class,
      entries: vec![PathBuf::from(format!(
        "/project/dataset/{}/sub-01.{}",
        location, filter.ext
      ))],
    })
  }
}

// 2. A toy processing interface owning the produced-data namespaces.
#[derive(Default)]
struct ToyInterface {
  label: Mutex<String>,
  processed: Mutex<BTreeMap<StepCode, String>>,
  counters: Arc<JobCounters>,
}

impl Interface for ToyInterface {
  fn label(&self) -> String {
    self.label.lock().clone()
  }

  fn update(&self) {}

  fn processed(&self) -> BTreeMap<StepCode, String> {
    self.processed.lock().clone()
  }

  fn reported(&self) -> BTreeMap<StepCode, String> {
    BTreeMap::new()
  }

  fn masked(&self) -> BTreeMap<StepCode, String> {
    BTreeMap::new()
  }

  fn waiting(&self) -> Vec<String> {
    Vec::new()
  }

  fn counters(&self) -> Arc<JobCounters> {
    Arc::clone(&self.counters)
  }

  fn running(&self) -> BTreeMap<String, StepWorkers> {
    BTreeMap::new()
  }

  fn destroy_step(&self, code: &StepCode, _mode: orchis::RemoveMode) -> Result<(), OrchisError> {
    self.processed.lock().remove(code);
    Ok(())
  }
}

struct ToyProvider {
  interface: Arc<ToyInterface>,
}

impl InterfaceProvider for ToyProvider {
  fn interface(
    &self,
    _bucket: Arc<dyn Bucket>,
    title: &str,
    _opts: &InterfaceOptions,
  ) -> Arc<dyn Interface> {
    *self.interface.label.lock() = title.to_string();
    Arc::clone(&self.interface) as Arc<dyn Interface>
  }
}

// 3. A pipeline package: one denoise step, two declared parameters.
struct DenoisePackage {
  interface: Arc<ToyInterface>,
}

impl PipelinePackage for DenoisePackage {
  fn title(&self) -> &str {
    "T1proc"
  }

  fn doc(&self) -> &str {
    "Toy structural preprocessing.\nKeyword Args:\n  tr(int): repetition time\n  fwhm(float): smoothing width"
  }

  fn bind(&self, builder: &mut PipelineBuilder<OrchisError>) -> anyhow::Result<()> {
    builder.param("tr", 2).param("fwhm", 0.5);

    let interface = Arc::clone(&self.interface);
    builder.step_fn("denoise", "Removes scanner noise.", move |ctx: StepContext| {
      let interface = Arc::clone(&interface);
      async move {
        info!(tr = %ctx.param("tr").cloned().unwrap_or(ParamValue::None), "denoising");
        interface
          .processed
          .lock()
          .insert(StepCode::new("010")?, "denoise".to_string());
        Ok::<(), OrchisError>(())
      }
    });
    Ok(())
  }
}

#[tokio::main]
async fn main() -> Result<(), OrchisError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Basic Run Example ---");

  let interface = Arc::new(ToyInterface::default());
  let provider = Arc::new(ToyProvider {
    interface: Arc::clone(&interface),
  });
  let registry = Arc::new(PackageRegistry::<OrchisError>::new(provider));
  registry.register_package(Arc::new(DenoisePackage {
    interface: Arc::clone(&interface),
  }));

  let mut pipe = Orchestrator::new_default(Arc::new(ToyBucket), registry);

  // Select the 0th installed package and run its 0th pipeline.
  pipe.set_package(0, &[])?;
  info!("pipelines: {:?}", pipe.installed_pipelines());
  pipe.run(0, &[("tr", ParamValue::from(3))]).await?;

  // Inspect what the run produced.
  println!("{}", pipe.summary());
  if let Some(view) = pipe.get_dset("010", None, None)? {
    println!("dataset view ({}): {:?}", view.class, view.entries);
  }

  Ok(())
}
