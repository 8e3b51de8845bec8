// src/lib.rs

//! Orchis: a pluggable orchestration engine for multi-step
//! dataset-processing pipelines.
//!
//! Orchis lets externally loaded packages ("plugins") supply the steps of
//! a processing pipeline while the engine handles:
//!  - Package selection against an index-keyed registry of installed packages.
//!  - An explicit step registry per package: index -> named, invocable step.
//!  - Typed package parameters, declared at bind time and validated on set.
//!  - Multi-category dataset resolution (processed / reported / masked).
//!  - Background job-progress tracking through an injected sink.
//!  - A read-only summary snapshot of everything a selection has produced.

// Declare modules according to the planned structure
pub mod core;
pub mod pipeline;
pub mod bucket;
pub mod interface;
pub mod registry;
pub mod resolver;
pub mod progress;
pub mod orchestrator;
pub mod config;
pub mod error;

// --- Re-exports for the Public API ---

// Core types that users will interact with frequently
pub use crate::core::counters::{CounterSnapshot, JobCounters};
pub use crate::core::params::ParamValue;
pub use crate::core::step::{FnStepRunner, StepContext, StepDef, StepRunner};

// The bound pipeline surface plugins and callers see
pub use crate::pipeline::binder::ParameterBinder;
pub use crate::pipeline::definition::{
  PipelineBuilder, PipelineDefinition, PipelinePackage, StepRegistry,
};

// Collaborator boundaries
pub use crate::bucket::{
  Bucket, DataClass, DatasetFilter, DatasetView, StepCode, StepCodes, DEFAULT_EXT,
};
pub use crate::interface::{
  Interface, InterfaceOptions, InterfaceProvider, RemoveMode, StepWorkers,
};

// Dataset resolution and progress tracking
pub use crate::progress::{ProgressHandle, ProgressSink, ProgressTracker, TracingSink};
pub use crate::resolver::{DatasetResolver, ResolvedDataset};

pub use crate::config::Config;
pub use crate::error::{OrchisError, OrchisResult};

// The package registry and the orchestrator façade
pub use crate::orchestrator::{Orchestrator, OrchestratorOptions};
pub use crate::registry::{PackageRef, PackageRegistry};

/*
    Core Workflow:
    1. Implement `Bucket` (dataset storage/indexing) and `InterfaceProvider`
       (per-selection processing interface) — or take them from a plugin.
    2. Implement `PipelinePackage` for each pipeline: register steps and
       declare parameters in `bind` through the `PipelineBuilder`.
    3. Create a `PackageRegistry`, register the packages in discovery order.
    4. Create an `Orchestrator` over the bucket and the registry.
    5. `set_package(idx, ..)`, optionally `set_param(..)`, then
       `run(step_index, ..).await`.
    6. Watch the selection with `check_progression()` and inspect produced
       data with `get_dset(..)` / `summary()`.
*/
