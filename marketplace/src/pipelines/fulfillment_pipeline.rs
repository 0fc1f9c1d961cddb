// marketplace/src/pipelines/fulfillment_pipeline.rs

use crate::errors::{AppError, Result as AppResult};
use crate::models::OrderStatus;
use crate::pipelines::common_steps::{return_tx, run_in_transaction, take_tx};
use crate::pipelines::contexts::{StatusUpdateCtxData, TxSlot};
use crate::services::accounts;
use crate::services::fulfillment::{self, StatusChange};
use crate::state::AppState;
use flowline::{ContextData, Flowline, Pipeline, PipelineControl};
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub fn register_status_update_pipeline(flow: &Flowline<AppError>) {
  let mut p = Pipeline::<StatusUpdateCtxData, AppError>::new(&[
    ("resolve_actor", false, None),
    ("load_order_and_authorize", false, None),
    ("apply_status_transition", false, None),
  ]);

  p.on("resolve_actor", |ctx_data: ContextData<StatusUpdateCtxData>| {
    Box::pin(async move {
      let user_id = { ctx_data.read().authenticated_user_id };
      let mut tx = take_tx(&ctx_data)?;
      let actor = accounts::resolve_actor(tx.as_mut(), user_id).await?;
      return_tx(&ctx_data, tx);
      ctx_data.write().actor = Some(actor);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on("load_order_and_authorize", load_order_and_authorize);

  p.on("apply_status_transition", |ctx_data: ContextData<StatusUpdateCtxData>| {
    Box::pin(async move {
      let (order, next, threshold) = {
        let guard = ctx_data.read();
        let order = guard
          .order
          .clone()
          .ok_or_else(|| AppError::Internal("Order was not loaded before transition.".to_string()))?;
        (order, guard.new_status, guard.app_state.config.low_stock_threshold)
      };

      let mut tx = take_tx(&ctx_data)?;
      let change = fulfillment::apply_transition(tx.as_mut(), &order, next, threshold).await?;
      return_tx(&ctx_data, tx);

      ctx_data.write().change = Some(change);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  flow.register_pipeline(p);
  info!("Order status update pipeline registered.");
}

async fn load_order_and_authorize(ctx_data: ContextData<StatusUpdateCtxData>) -> AppResult<PipelineControl> {
  let (order_id, actor) = {
    let guard = ctx_data.read();
    let actor = guard
      .actor
      .ok_or_else(|| AppError::Internal("Actor was not resolved before authorization.".to_string()))?;
    (guard.order_id, actor)
  };

  let mut tx = take_tx(&ctx_data)?;
  // Row lock held until commit, so concurrent updates of one order queue up.
  let order = tx.lock_order(order_id).await?;
  return_tx(&ctx_data, tx);

  let order = order.ok_or_else(|| AppError::NotFound(format!("Order with ID {} not found.", order_id)))?;
  if !actor.is_admin() && !actor.is_seller(order.seller_id) {
    warn!(%order_id, user_id = %actor.user_id, "Status update refused: not the order's seller.");
    return Err(AppError::Permission(
      "Only the order's seller or an admin can change its status.".to_string(),
    ));
  }
  ctx_data.write().order = Some(order);
  Ok(PipelineControl::Continue)
}

/// Seller- or admin-driven status change.
#[instrument(name = "orders::update_status", skip(app_state), err)]
pub async fn update_status(
  app_state: &AppState,
  user_id: Uuid,
  order_id: Uuid,
  new_status: OrderStatus,
) -> AppResult<StatusChange> {
  let tx = app_state.store.begin().await?;
  let ctx_data = ContextData::new(StatusUpdateCtxData {
    app_state: app_state.clone(),
    tx: TxSlot::new(tx),
    authenticated_user_id: user_id,
    order_id,
    new_status,
    actor: None,
    order: None,
    change: None,
  });
  run_in_transaction(app_state, ctx_data.clone()).await?;

  let change = ctx_data.write().change.take();
  change.ok_or_else(|| AppError::Internal("Status update completed without a result.".to_string()))
}
