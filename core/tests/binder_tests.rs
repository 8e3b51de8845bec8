// tests/binder_tests.rs
mod common;

use common::*;
use orchis::{
  OrchisError, Orchestrator, OrchestratorOptions, PackageRegistry, ParamValue, PipelineBuilder,
  PipelinePackage, StepContext,
};
use parking_lot::Mutex;
use std::sync::Arc;

fn quiet() -> OrchestratorOptions {
  OrchestratorOptions {
    verbose: Some(false),
    ..OrchestratorOptions::default()
  }
}

#[tokio::test]
async fn test_set_param_requires_declared_name() {
  setup_tracing();
  let bucket = MemoryBucket::new("/data");
  let provider = TestProvider::new();
  let registry = Arc::new(PackageRegistry::<OrchisError>::new(provider.clone()));
  registry.register_package(Arc::new(DenoisePackage::new(provider)));
  let mut pipe = Orchestrator::with_options(bucket, registry, quiet());
  pipe.set_package(0, &[]).unwrap();

  // Declared names can be set...
  pipe.set_param(&[("tr", ParamValue::from(3))]).unwrap();
  assert_eq!(pipe.get_param().unwrap()["tr"], ParamValue::Int(3));

  // ...anything else is rejected, with no table change.
  let result = pipe.set_param(&[("no_such_param", ParamValue::from(1))]);
  match result {
    Err(OrchisError::UnknownParameterName { name, package }) => {
      assert_eq!(name, "no_such_param");
      assert_eq!(package, "T1proc");
    }
    other => panic!("Expected UnknownParameterName, got {:?}", other),
  }
  assert!(!pipe.get_param().unwrap().contains_key("no_such_param"));
}

#[tokio::test]
async fn test_apply_is_all_or_nothing() {
  setup_tracing();
  let bucket = MemoryBucket::new("/data");
  let provider = TestProvider::new();
  let registry = Arc::new(PackageRegistry::<OrchisError>::new(provider.clone()));
  registry.register_package(Arc::new(DenoisePackage::new(provider)));
  let mut pipe = Orchestrator::with_options(bucket, registry, quiet());
  pipe.set_package(0, &[]).unwrap();

  let result = pipe.set_param(&[
    ("tr", ParamValue::from(9)),
    ("bogus", ParamValue::from(true)),
  ]);
  assert!(matches!(
    result,
    Err(OrchisError::UnknownParameterName { .. })
  ));
  // The valid half of the batch was not applied either.
  assert_eq!(pipe.get_param().unwrap()["tr"], ParamValue::Int(2));
}

#[tokio::test]
async fn test_get_param_reflects_declared_defaults() {
  setup_tracing();
  let bucket = MemoryBucket::new("/data");
  let provider = TestProvider::new();
  let registry = Arc::new(PackageRegistry::<OrchisError>::new(provider.clone()));
  registry.register_package(Arc::new(DenoisePackage::new(provider)));
  let mut pipe = Orchestrator::with_options(bucket, registry, quiet());

  assert!(pipe.get_param().is_none());

  pipe.set_package(0, &[]).unwrap();
  let params = pipe.get_param().unwrap();
  assert_eq!(params["tr"], ParamValue::Int(2));
  assert_eq!(params["tpattern"], ParamValue::Str("altplus".to_string()));
  assert_eq!(params["fwhm"], ParamValue::Float(0.5));
  assert_eq!(params["mask_path"], ParamValue::None);
}

#[tokio::test]
async fn test_reset_restores_package_defaults() {
  setup_tracing();
  let bucket = MemoryBucket::new("/data");
  let provider = TestProvider::new();
  let registry = Arc::new(PackageRegistry::<OrchisError>::new(provider.clone()));
  registry.register_package(Arc::new(DenoisePackage::new(provider)));
  let mut pipe = Orchestrator::with_options(bucket, registry, quiet());

  pipe.set_package(0, &[("tr", ParamValue::from(5))]).unwrap();
  assert_eq!(pipe.get_param().unwrap()["tr"], ParamValue::Int(5));

  // Re-binding without initial parameters goes back to the defaults.
  pipe.reset(&[]).unwrap();
  assert_eq!(pipe.get_param().unwrap()["tr"], ParamValue::Int(2));
}

// Package whose step records the parameter snapshot it was invoked with.
struct SnapshotPackage {
  pub seen: Arc<Mutex<Option<ParamValue>>>,
}

impl PipelinePackage for SnapshotPackage {
  fn title(&self) -> &str {
    "Snapshot"
  }

  fn doc(&self) -> &str {
    "Records the tr value its step observes."
  }

  fn bind(&self, builder: &mut PipelineBuilder<OrchisError>) -> anyhow::Result<()> {
    builder.param("tr", 2);
    let seen = Arc::clone(&self.seen);
    builder.step_fn("observe", "", move |ctx: StepContext| {
      let seen = Arc::clone(&seen);
      async move {
        *seen.lock() = ctx.param("tr").cloned();
        Ok::<(), OrchisError>(())
      }
    });
    Ok(())
  }
}

#[tokio::test]
async fn test_run_scoped_params_reach_the_step() {
  setup_tracing();
  let bucket = MemoryBucket::new("/data");
  let provider = TestProvider::new();
  let registry = Arc::new(PackageRegistry::<OrchisError>::new(provider));
  let seen = Arc::new(Mutex::new(None));
  registry.register_package(Arc::new(SnapshotPackage {
    seen: Arc::clone(&seen),
  }));
  let mut pipe = Orchestrator::with_options(bucket, registry, quiet());
  pipe.set_package(0, &[]).unwrap();

  // A sticky parameter set before the run is clobbered by the
  // unconditional re-bind; only run-scoped values survive it.
  pipe.set_param(&[("tr", ParamValue::from(7))]).unwrap();
  pipe.run(0, &[("tr", ParamValue::from(3))]).await.unwrap();
  assert_eq!(seen.lock().clone(), Some(ParamValue::Int(3)));

  pipe.run(0, &[]).await.unwrap();
  assert_eq!(seen.lock().clone(), Some(ParamValue::Int(2)));
}
