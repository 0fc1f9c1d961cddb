// marketplace/src/pipelines/webhook_pipeline.rs

use crate::errors::{AppError, Result as AppResult};
use crate::pipelines::common_steps::{return_tx, run_in_transaction, take_tx};
use crate::pipelines::contexts::{PaymentWebhookCtxData, TxSlot};
use crate::services::payment::{self, PaymentEvent, PaymentEventKind, PaymentOutcome};
use crate::state::AppState;
use actix_web::web::Bytes;
use flowline::{ContextData, Flowline, Pipeline, PipelineControl, SkipCondition};
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub fn register_webhook_pipeline(flow: &Flowline<AppError>) {
  // Events we do not act on were already answered by the parse step.
  let unhandled_event: SkipCondition<PaymentWebhookCtxData> = Arc::new(|ctx_data: ContextData<PaymentWebhookCtxData>| {
    ctx_data
      .read()
      .event
      .as_ref()
      .map_or(true, |e| e.event_type == PaymentEventKind::Unknown)
  });

  let mut p = Pipeline::<PaymentWebhookCtxData, AppError>::new(&[
    ("parse_webhook_payload", false, None),
    ("route_payment_event", false, Some(unhandled_event)),
  ]);

  p.on("parse_webhook_payload", |ctx_data: ContextData<PaymentWebhookCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let event: PaymentEvent = serde_json::from_slice(&guard.raw_payload).map_err(|e| {
        warn!(
          "Webhook Pipeline: Failed to parse payload from source '{}': {}",
          guard.source_identifier, e
        );
        AppError::Validation(format!("Malformed webhook payload: {}", e))
      })?;
      info!(
        "Webhook Pipeline: '{:?}' event for order {} from source '{}'.",
        event.event_type, event.order_id, guard.source_identifier
      );
      if event.event_type == PaymentEventKind::Unknown {
        guard.outcome = Some(PaymentOutcome::Ignored {
          order_id: event.order_id,
          reason: "unhandled event type".to_string(),
        });
      }
      guard.event = Some(event);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on("route_payment_event", route_payment_event);

  flow.register_pipeline(p);
  info!("Payment webhook pipeline registered.");
}

async fn route_payment_event(ctx_data: ContextData<PaymentWebhookCtxData>) -> AppResult<PipelineControl> {
  let (event, threshold) = {
    let guard = ctx_data.read();
    let event = guard
      .event
      .clone()
      .ok_or_else(|| AppError::Internal("Webhook event was not parsed.".to_string()))?;
    (event, guard.app_state.config.low_stock_threshold)
  };

  let mut tx = take_tx(&ctx_data)?;
  let outcome = payment::handle_event(tx.as_mut(), &event, threshold).await?;
  return_tx(&ctx_data, tx);

  info!("Webhook Pipeline: {:?}", outcome);
  ctx_data.write().outcome = Some(outcome);
  Ok(PipelineControl::Continue)
}

/// Applies a payment gateway callback.
#[instrument(name = "webhooks::process", skip(app_state, raw_payload), fields(payload_len = raw_payload.len()), err)]
pub async fn process_webhook(app_state: &AppState, source_identifier: String, raw_payload: Bytes) -> AppResult<PaymentOutcome> {
  let tx = app_state.store.begin().await?;
  let ctx_data = ContextData::new(PaymentWebhookCtxData {
    app_state: app_state.clone(),
    tx: TxSlot::new(tx),
    source_identifier,
    raw_payload,
    event: None,
    outcome: None,
  });
  run_in_transaction(app_state, ctx_data.clone()).await?;

  let outcome = ctx_data.write().outcome.take();
  outcome.ok_or_else(|| AppError::Internal("Webhook processed without an outcome.".to_string()))
}
