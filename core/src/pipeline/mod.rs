// orchis/src/pipeline/mod.rs

//! The bound form of a pipeline package: definition, parameter binding,
//! and step invocation.

pub mod binder;
pub mod definition;
pub mod execution;

pub use binder::ParameterBinder;
pub use definition::{PipelineBuilder, PipelineDefinition, PipelinePackage, StepRegistry};
