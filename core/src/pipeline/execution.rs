// orchis/src/pipeline/execution.rs

//! Contains `StepRegistry::invoke`, the single place where a registered
//! step runner is actually called.

use crate::core::step::StepContext;
use crate::error::OrchisError;
use crate::pipeline::definition::StepRegistry;
use tracing::{event, instrument, Level};

impl<Err> StepRegistry<Err>
where
  Err: std::error::Error + From<OrchisError> + Send + Sync + 'static,
{
  /// Resolves `index` and awaits the corresponding runner.
  ///
  /// The invocation is a plain map lookup plus an indirect call — nothing
  /// is synthesized from names at runtime. The call blocks the caller for
  /// the full duration of the delegated plugin work; whatever the runner
  /// produces, it produces by mutating the storage collaborator carried
  /// in `ctx`.
  ///
  /// An index outside `[0, len)` fails with `UnknownStepIndex`.
  #[instrument(
        name = "StepRegistry::invoke",
        skip(self, ctx),
        fields(
            package = %self.package,
            step_index = index,
            num_steps = self.steps.len(),
        ),
        err(Display)
    )]
  pub async fn invoke(&self, index: usize, ctx: StepContext) -> Result<(), Err> {
    let def = match self.steps.get(index) {
      Some(def) => def,
      None => {
        event!(Level::ERROR, "Step index outside the registered range.");
        return Err(Err::from(OrchisError::UnknownStepIndex {
          index,
          package: self.package.clone(),
          count: self.steps.len(),
        }));
      }
    };

    event!(Level::DEBUG, step_name = %def.name, "Invoking step runner.");
    match def.runner.run(ctx).await {
      Ok(()) => {
        event!(Level::DEBUG, step_name = %def.name, "Step runner returned.");
        Ok(())
      }
      Err(e) => {
        event!(Level::ERROR, step_name = %def.name, error = %e, "Step runner failed.");
        Err(e)
      }
    }
  }
}
