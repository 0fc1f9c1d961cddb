// marketplace/src/services/fulfillment.rs

//! Order status transitions and their side effects.

use crate::errors::{AppError, Result as AppResult};
use crate::models::{Order, OrderItem, OrderStatus, Recipient};
use crate::services::notifications;
use crate::store::StoreTx;
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct LowStock {
  pub product_id: Uuid,
  pub product_name: String,
  pub remaining: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusChange {
  pub order: Order,
  /// False when the order already had the requested status.
  pub changed: bool,
  pub low_stock: Vec<LowStock>,
}

/// Sums quantities per product, keeping first-seen order. Sums saturate,
/// which still exceeds any stock level.
fn quantities_by_product(items: &[OrderItem]) -> Vec<(Uuid, i64)> {
  let mut totals: Vec<(Uuid, i64)> = Vec::new();
  for item in items {
    match totals.iter_mut().find(|(id, _)| *id == item.product_id) {
      Some((_, qty)) => *qty = qty.saturating_add(item.quantity),
      None => totals.push((item.product_id, item.quantity)),
    }
  }
  totals
}

/// Takes the order's items out of stock. Every product is checked before
/// the first write; a conditional decrement still guards against a
/// concurrent buyer winning between check and write.
async fn decrement_inventory(
  tx: &mut dyn StoreTx,
  order: &Order,
  low_stock_threshold: i64,
) -> AppResult<Vec<LowStock>> {
  let items = tx.order_items(order.id).await?;
  let wanted = quantities_by_product(&items);

  let mut products = Vec::with_capacity(wanted.len());
  for &(product_id, quantity) in &wanted {
    let product = tx
      .get_product(product_id)
      .await?
      .ok_or_else(|| AppError::NotFound(format!("Product with ID {} not found.", product_id)))?;
    if product.stock < quantity {
      warn!(order_id = %order.id, %product_id, requested = quantity, available = product.stock, "Insufficient stock for delivery.");
      return Err(AppError::InsufficientStock {
        product_id,
        requested: quantity,
        available: product.stock,
      });
    }
    products.push((product, quantity));
  }

  let mut low_stock = Vec::new();
  for (product, quantity) in products {
    let remaining = match tx.decrement_stock(product.id, quantity).await? {
      Some(remaining) => remaining,
      None => {
        let available = tx.get_product(product.id).await?.map_or(0, |p| p.stock);
        return Err(AppError::InsufficientStock {
          product_id: product.id,
          requested: quantity,
          available,
        });
      }
    };
    if remaining < low_stock_threshold {
      low_stock.push(LowStock {
        product_id: product.id,
        product_name: product.name,
        remaining,
      });
    }
  }
  Ok(low_stock)
}

/// Moves `order` to `next` inside the caller's transaction.
///
/// Re-applying the current status changes nothing. Entering `delivered`
/// takes stock; every real change notifies the customer, a cancellation
/// also notifies the seller, and low stock left behind by a delivery is
/// reported to the seller.
pub async fn apply_transition(
  tx: &mut dyn StoreTx,
  order: &Order,
  next: OrderStatus,
  low_stock_threshold: i64,
) -> AppResult<StatusChange> {
  if order.status == next {
    info!(order_id = %order.id, status = %next, "Order already has the requested status.");
    return Ok(StatusChange {
      order: order.clone(),
      changed: false,
      low_stock: Vec::new(),
    });
  }
  if !order.status.can_transition_to(next) {
    return Err(AppError::State {
      from: order.status,
      to: next,
    });
  }

  let low_stock = if next == OrderStatus::Delivered {
    decrement_inventory(tx, order, low_stock_threshold).await?
  } else {
    Vec::new()
  };

  let now = Utc::now();
  tx.update_order_status(order.id, next, now).await?;
  let mut updated = order.clone();
  updated.status = next;
  updated.updated_at = now;

  notifications::create(
    tx,
    Recipient::User(order.customer_id),
    "Order status updated",
    format!("Your order {} is now {}.", order.id, next),
    Some(format!("/orders/{}", order.id)),
  )
  .await?;

  if next == OrderStatus::Canceled || !low_stock.is_empty() {
    let seller = tx
      .get_seller(order.seller_id)
      .await?
      .ok_or_else(|| AppError::NotFound(format!("Seller with ID {} not found.", order.seller_id)))?;
    if next == OrderStatus::Canceled {
      notifications::create(
        tx,
        Recipient::User(seller.user_id),
        "Order canceled",
        format!("Order {} was canceled.", order.id),
        Some(format!("/seller/orders/{}", order.id)),
      )
      .await?;
    }
    for low in &low_stock {
      notifications::create(
        tx,
        Recipient::User(seller.user_id),
        "Low stock",
        format!("'{}' has only {} left in stock.", low.product_name, low.remaining),
        Some(format!("/seller/products/{}", low.product_id)),
      )
      .await?;
    }
  }

  info!(order_id = %order.id, from = %order.status, to = %next, low_stock = low_stock.len(), "Order status changed.");
  Ok(StatusChange {
    order: updated,
    changed: true,
    low_stock,
  })
}
