// marketplace/src/services/payment.rs

//! Reactions to the payment gateway. The gateway is trusted, so no actor
//! permission applies; only pending orders are moved.

use crate::errors::{AppError, Result as AppResult};
use crate::models::OrderStatus;
use crate::services::fulfillment;
use crate::store::StoreTx;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentEventKind {
  PaymentSucceeded,
  PaymentFailed,
  #[serde(other)]
  Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentEvent {
  pub event_type: PaymentEventKind,
  pub order_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PaymentOutcome {
  Applied { order_id: Uuid, status: OrderStatus },
  Ignored { order_id: Uuid, reason: String },
}

async fn settle(
  tx: &mut dyn StoreTx,
  order_id: Uuid,
  next: OrderStatus,
  low_stock_threshold: i64,
) -> AppResult<PaymentOutcome> {
  let order = tx
    .lock_order(order_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Order with ID {} not found.", order_id)))?;
  if order.status != OrderStatus::Pending {
    info!(%order_id, status = %order.status, "Payment event for a non-pending order ignored.");
    return Ok(PaymentOutcome::Ignored {
      order_id,
      reason: format!("order is {}", order.status),
    });
  }
  fulfillment::apply_transition(tx, &order, next, low_stock_threshold).await?;
  Ok(PaymentOutcome::Applied { order_id, status: next })
}

/// pending -> confirmed.
pub async fn payment_confirmed(tx: &mut dyn StoreTx, order_id: Uuid, low_stock_threshold: i64) -> AppResult<PaymentOutcome> {
  settle(tx, order_id, OrderStatus::Confirmed, low_stock_threshold).await
}

/// pending -> canceled.
pub async fn payment_failed(tx: &mut dyn StoreTx, order_id: Uuid, low_stock_threshold: i64) -> AppResult<PaymentOutcome> {
  settle(tx, order_id, OrderStatus::Canceled, low_stock_threshold).await
}

pub async fn handle_event(tx: &mut dyn StoreTx, event: &PaymentEvent, low_stock_threshold: i64) -> AppResult<PaymentOutcome> {
  match event.event_type {
    PaymentEventKind::PaymentSucceeded => payment_confirmed(tx, event.order_id, low_stock_threshold).await,
    PaymentEventKind::PaymentFailed => payment_failed(tx, event.order_id, low_stock_threshold).await,
    PaymentEventKind::Unknown => Ok(PaymentOutcome::Ignored {
      order_id: event.order_id,
      reason: "unhandled event type".to_string(),
    }),
  }
}
