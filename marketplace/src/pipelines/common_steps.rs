// marketplace/src/pipelines/common_steps.rs

//! Plumbing shared by all transactional pipelines.

use crate::errors::{AppError, Result as AppResult};
use crate::pipelines::contexts::Transactional;
use crate::state::AppState;
use crate::store::StoreTx;
use flowline::{ContextData, PipelineResult};
use tracing::{info, instrument, warn};

/// Takes the run's transaction out of the context.
pub fn take_tx<T: Transactional>(ctx_data: &ContextData<T>) -> AppResult<Box<dyn StoreTx>> {
  let guard = ctx_data.read();
  guard.tx_slot().take()
}

/// Hands the transaction back for the next step.
pub fn return_tx<T: Transactional>(ctx_data: &ContextData<T>, tx: Box<dyn StoreTx>) {
  let guard = ctx_data.read();
  guard.tx_slot().put(tx);
}

/// Runs the pipeline registered for `T` and commits its transaction once
/// every step has passed. Any error, or a stop, drops the transaction and
/// with it every write the steps made.
#[instrument(name = "pipelines::run_in_transaction", skip_all, fields(context_type = %std::any::type_name::<T>()), err)]
pub async fn run_in_transaction<T: Transactional>(app_state: &AppState, ctx_data: ContextData<T>) -> AppResult<()> {
  match app_state.flow.run(ctx_data.clone()).await? {
    PipelineResult::Completed => {}
    PipelineResult::Stopped => {
      warn!("Pipeline was stopped by a handler, rolling back.");
      return Err(AppError::PipelineHaltedByHandler);
    }
  }
  let tx = take_tx(&ctx_data)?;
  tx.commit().await?;
  info!("Pipeline transaction committed.");
  Ok(())
}
