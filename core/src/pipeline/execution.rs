// core/src/pipeline/execution.rs

//! `Pipeline::run`.

use crate::core::context_data::ContextData;
use crate::core::control::{PipelineControl, PipelineResult};
use crate::core::handler::Handler;
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;
use tracing::{event, instrument, Instrument, Level};

/// What a phase asked the run to do next.
enum PhaseOutcome {
  Continue,
  Stop,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Runs every step in order against `ctx_data`.
  ///
  /// Per step: the skip condition is checked, then the `before`, `on` and
  /// `after` handlers run in that order. The first handler error aborts the
  /// run and is returned as is; a `Stop` ends the run with
  /// [`PipelineResult::Stopped`]. A non-optional step without any handler
  /// fails with [`FlowError::HandlerMissing`].
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(context_type = %std::any::type_name::<TData>(), num_steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    for (step_index, step) in self.steps.iter().enumerate() {
      let name = step.name.as_str();
      let span = tracing::info_span!("pipeline_step", step_name = name, step_index, optional = step.optional);

      if let Some(skip_if) = &step.skip_if {
        if skip_if(ctx_data.clone()) {
          event!(parent: &span, Level::DEBUG, "step skipped by its condition");
          continue;
        }
      }

      let phases = [
        ("before", self.before.get(name)),
        ("on", self.on.get(name)),
        ("after", self.after.get(name)),
      ];

      if phases.iter().all(|(_, handlers)| handlers.map_or(true, |v| v.is_empty())) {
        if step.optional {
          event!(parent: &span, Level::DEBUG, "optional step has no handlers, skipping");
          continue;
        }
        event!(parent: &span, Level::ERROR, "required step has no handlers");
        return Err(Err::from(FlowError::HandlerMissing {
          step_name: step.name.clone(),
        }));
      }

      for (phase, handlers) in phases {
        let Some(handlers) = handlers else { continue };
        match run_phase(phase, handlers, &ctx_data).instrument(span.clone()).await? {
          PhaseOutcome::Continue => {}
          PhaseOutcome::Stop => {
            event!(parent: &span, Level::INFO, phase, "pipeline stopped by a handler");
            return Ok(PipelineResult::Stopped);
          }
        }
      }
    }

    event!(Level::DEBUG, "pipeline completed");
    Ok(PipelineResult::Completed)
  }
}

async fn run_phase<TData, Err>(
  phase: &'static str,
  handlers: &[Handler<TData, Err>],
  ctx_data: &ContextData<TData>,
) -> Result<PhaseOutcome, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + Send + Sync + 'static,
{
  for (handler_index, handler) in handlers.iter().enumerate() {
    match handler(ctx_data.clone()).await {
      Ok(PipelineControl::Continue) => {}
      Ok(PipelineControl::Stop) => return Ok(PhaseOutcome::Stop),
      Err(e) => {
        event!(Level::WARN, phase, handler_index, error = %e, "handler failed");
        return Err(e);
      }
    }
  }
  Ok(PhaseOutcome::Continue)
}
