// marketplace/src/pipelines/checkout_pipeline.rs

use crate::errors::{AppError, Result as AppResult};
use crate::models::ShippingMethod;
use crate::pipelines::common_steps::{return_tx, run_in_transaction, take_tx};
use crate::pipelines::contexts::{CheckoutCtxData, TxSlot};
use crate::services::order_splitter::{self, CheckoutRequest, PlacedOrder};
use crate::services::{accounts, cart};
use crate::state::AppState;
use chrono::Utc;
use flowline::{ContextData, Flowline, Pipeline, PipelineControl, SkipCondition};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

pub fn register_checkout_pipeline(flow: &Flowline<AppError>) {
  let no_source_cart: SkipCondition<CheckoutCtxData> =
    Arc::new(|ctx_data: ContextData<CheckoutCtxData>| ctx_data.read().source_cart_id.is_none());

  let mut p = Pipeline::<CheckoutCtxData, AppError>::new(&[
    ("resolve_customer", false, None),
    ("validate_checkout_request", false, None),
    ("partition_by_seller", false, None),
    ("persist_split_orders", false, None),
    ("notify_checkout_parties", false, None),
    ("clear_source_cart", true, Some(no_source_cart)),
  ]);

  p.on("resolve_customer", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let customer_id = { ctx_data.read().customer_id };
      let mut tx = take_tx(&ctx_data)?;
      accounts::resolve_actor(tx.as_mut(), customer_id).await?;
      return_tx(&ctx_data, tx);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on("validate_checkout_request", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let guard = ctx_data.read();
      order_splitter::validate_request(&guard.request)?;
      info!(
        "Checkout Pipeline (Customer {}): {} line(s) validated.",
        guard.customer_id,
        guard.request.items.len()
      );
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on("partition_by_seller", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let groups = order_splitter::partition_by_seller(&guard.request.items)?;
      info!("Checkout Pipeline: items split across {} seller(s).", groups.len());
      guard.groups = groups;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on("persist_split_orders", persist_split_orders);
  p.on("notify_checkout_parties", notify_checkout_parties);

  p.on("clear_source_cart", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let cart_id = { ctx_data.read().source_cart_id };
      if let Some(cart_id) = cart_id {
        let mut tx = take_tx(&ctx_data)?;
        tx.clear_cart(cart_id).await?;
        return_tx(&ctx_data, tx);
        info!("Checkout Pipeline: cart {} cleared.", cart_id);
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  flow.register_pipeline(p);
  info!("Checkout pipeline registered.");
}

async fn persist_split_orders(ctx_data: ContextData<CheckoutCtxData>) -> AppResult<PipelineControl> {
  let (customer_id, request, groups, shipping_cost_cents) = {
    let guard = ctx_data.read();
    (
      guard.customer_id,
      guard.request.clone(),
      guard.groups.clone(),
      guard.app_state.config.shipping_rates.cost_for(guard.request.shipping_method),
    )
  };

  let now = Utc::now();
  let mut tx = take_tx(&ctx_data)?;
  let mut placed = Vec::with_capacity(groups.len());
  for group in &groups {
    placed.push(order_splitter::persist_group(tx.as_mut(), customer_id, &request, group, shipping_cost_cents, now).await?);
  }
  return_tx(&ctx_data, tx);

  info!("Checkout Pipeline (Customer {}): {} order(s) staged.", customer_id, placed.len());
  ctx_data.write().placed = placed;
  Ok(PipelineControl::Continue)
}

async fn notify_checkout_parties(ctx_data: ContextData<CheckoutCtxData>) -> AppResult<PipelineControl> {
  let (customer_id, placed) = {
    let guard = ctx_data.read();
    (guard.customer_id, guard.placed.clone())
  };
  let mut tx = take_tx(&ctx_data)?;
  order_splitter::notify_parties(tx.as_mut(), customer_id, &placed).await?;
  return_tx(&ctx_data, tx);
  Ok(PipelineControl::Continue)
}

async fn run(app_state: &AppState, ctx: CheckoutCtxData) -> AppResult<Vec<PlacedOrder>> {
  let ctx_data = ContextData::new(ctx);
  run_in_transaction(app_state, ctx_data.clone()).await?;
  let placed = std::mem::take(&mut ctx_data.write().placed);
  Ok(placed)
}

/// Places one order per seller for the given lines, all or nothing.
#[instrument(name = "checkout::explicit", skip(app_state, request), fields(items = request.items.len()), err)]
pub async fn checkout(app_state: &AppState, customer_id: Uuid, request: CheckoutRequest) -> AppResult<Vec<PlacedOrder>> {
  let tx = app_state.store.begin().await?;
  let ctx = CheckoutCtxData {
    app_state: app_state.clone(),
    tx: TxSlot::new(tx),
    customer_id,
    request,
    source_cart_id: None,
    groups: Vec::new(),
    placed: Vec::new(),
  };
  run(app_state, ctx).await
}

/// Checks out the user's cart at current prices and empties it in the same
/// transaction.
#[instrument(name = "checkout::cart", skip(app_state, address), err)]
pub async fn checkout_cart(
  app_state: &AppState,
  customer_id: Uuid,
  address: String,
  shipping_method: ShippingMethod,
) -> AppResult<Vec<PlacedOrder>> {
  let mut tx = app_state.store.begin().await?;
  let (source_cart, items) = cart::checkout_lines(tx.as_mut(), customer_id).await?;
  let ctx = CheckoutCtxData {
    app_state: app_state.clone(),
    tx: TxSlot::new(tx),
    customer_id,
    request: CheckoutRequest {
      address,
      shipping_method,
      items,
    },
    source_cart_id: Some(source_cart.id),
    groups: Vec::new(),
    placed: Vec::new(),
  };
  run(app_state, ctx).await
}
