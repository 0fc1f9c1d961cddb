// marketplace/src/services/order_splitter.rs

//! Splits one checkout into one order per seller.
//!
//! The functions here run inside the checkout transaction; a failure for any
//! seller aborts every order of the checkout.

use crate::errors::{AppError, Result as AppResult};
use crate::models::{Order, OrderItem, OrderStatus, Recipient, ShippingMethod};
use crate::services::notifications;
use crate::store::StoreTx;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLine {
  pub product_id: Uuid,
  pub quantity: i64,
  /// Required; kept optional so a missing seller is reported as a
  /// validation error rather than a parse failure.
  #[serde(default)]
  pub seller_id: Option<Uuid>,
  pub unit_price_cents: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
  pub address: String,
  #[serde(default)]
  pub shipping_method: ShippingMethod,
  pub items: Vec<CheckoutLine>,
}

/// The lines of one seller, in request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellerGroup {
  pub seller_id: Uuid,
  pub lines: Vec<CheckoutLine>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlacedOrder {
  pub order: Order,
  pub items: Vec<OrderItem>,
}

/// Summary returned to the customer after checkout.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
  pub id: Uuid,
  pub seller_id: Uuid,
  pub status: OrderStatus,
  pub total_price_cents: i64,
  pub shipping_cost_cents: i64,
  pub item_count: usize,
}

impl From<&PlacedOrder> for OrderSummary {
  fn from(placed: &PlacedOrder) -> Self {
    Self {
      id: placed.order.id,
      seller_id: placed.order.seller_id,
      status: placed.order.status,
      total_price_cents: placed.order.total_price_cents,
      shipping_cost_cents: placed.order.shipping_cost_cents,
      item_count: placed.items.len(),
    }
  }
}

pub fn validate_request(request: &CheckoutRequest) -> AppResult<()> {
  if request.items.is_empty() {
    return Err(AppError::Validation("Checkout requires at least one item.".to_string()));
  }
  if request.address.trim().is_empty() && request.shipping_method != ShippingMethod::Pickup {
    return Err(AppError::Validation("A delivery address is required.".to_string()));
  }
  for line in &request.items {
    if line.seller_id.is_none() {
      return Err(AppError::Validation("Each item must declare its seller.".to_string()));
    }
    if line.quantity < 1 {
      return Err(AppError::Validation(format!(
        "Quantity for product {} must be at least 1.",
        line.product_id
      )));
    }
    if line.unit_price_cents < 0 {
      return Err(AppError::Validation(format!(
        "Price for product {} must not be negative.",
        line.product_id
      )));
    }
  }
  Ok(())
}

/// Groups lines by seller. Groups come out in order of each seller's first
/// line.
pub fn partition_by_seller(lines: &[CheckoutLine]) -> AppResult<Vec<SellerGroup>> {
  let mut groups: Vec<SellerGroup> = Vec::new();
  for line in lines {
    let seller_id = line
      .seller_id
      .ok_or_else(|| AppError::Validation("Each item must declare its seller.".to_string()))?;
    match groups.iter_mut().find(|g| g.seller_id == seller_id) {
      Some(group) => group.lines.push(line.clone()),
      None => groups.push(SellerGroup {
        seller_id,
        lines: vec![line.clone()],
      }),
    }
  }
  Ok(groups)
}

fn amount_out_of_range(seller_id: Uuid) -> AppError {
  warn!(%seller_id, "Order total does not fit in the price range.");
  AppError::Validation("Order total is too large.".to_string())
}

/// Creates the order and its items for one seller group.
pub async fn persist_group(
  tx: &mut dyn StoreTx,
  customer_id: Uuid,
  request: &CheckoutRequest,
  group: &SellerGroup,
  shipping_cost_cents: i64,
  now: DateTime<Utc>,
) -> AppResult<PlacedOrder> {
  if tx.get_seller(group.seller_id).await?.is_none() {
    return Err(AppError::NotFound(format!("Seller with ID {} not found.", group.seller_id)));
  }

  let order_id = Uuid::new_v4();
  let mut items = Vec::with_capacity(group.lines.len());
  let mut items_total_cents = 0_i64;

  for line in &group.lines {
    let product = tx
      .get_product(line.product_id)
      .await?
      .ok_or_else(|| AppError::NotFound(format!("Product with ID {} not found.", line.product_id)))?;
    if product.seller_id != group.seller_id {
      return Err(AppError::Validation(format!(
        "Product {} is not sold by seller {}.",
        product.id, group.seller_id
      )));
    }
    if !product.is_purchasable() {
      return Err(AppError::Validation(format!(
        "Product {} is not available for purchase.",
        product.id
      )));
    }
    let price = product.effective_price_at(now);
    if price != line.unit_price_cents {
      return Err(AppError::Validation(format!(
        "Price changed for product {}: now {} cents.",
        product.id, price
      )));
    }

    items_total_cents = price
      .checked_mul(line.quantity)
      .and_then(|line_total| items_total_cents.checked_add(line_total))
      .ok_or_else(|| amount_out_of_range(group.seller_id))?;
    items.push(OrderItem {
      id: Uuid::new_v4(),
      order_id,
      product_id: product.id,
      quantity: line.quantity,
      unit_price_cents: price,
    });
  }

  let total_price_cents = items_total_cents
    .checked_add(shipping_cost_cents)
    .ok_or_else(|| amount_out_of_range(group.seller_id))?;

  let order = Order {
    id: order_id,
    customer_id,
    seller_id: group.seller_id,
    status: OrderStatus::Pending,
    total_price_cents,
    shipping_method: request.shipping_method,
    shipping_cost_cents,
    address: request.address.trim().to_string(),
    created_at: now,
    updated_at: now,
  };
  tx.insert_order(&order).await?;
  for item in &items {
    tx.insert_order_item(item).await?;
  }
  debug!(order_id = %order.id, seller_id = %order.seller_id, total = order.total_price_cents, "Split order created.");
  Ok(PlacedOrder { order, items })
}

/// One notification to the customer and one per seller.
pub async fn notify_parties(tx: &mut dyn StoreTx, customer_id: Uuid, placed: &[PlacedOrder]) -> AppResult<()> {
  notifications::create(
    tx,
    Recipient::User(customer_id),
    "Order placed",
    format!("Your checkout created {} order(s).", placed.len()),
    Some("/orders".to_string()),
  )
  .await?;

  for p in placed {
    let seller = tx
      .get_seller(p.order.seller_id)
      .await?
      .ok_or_else(|| AppError::NotFound(format!("Seller with ID {} not found.", p.order.seller_id)))?;
    notifications::create(
      tx,
      Recipient::User(seller.user_id),
      "New order",
      format!(
        "Order {} with {} item(s) totalling {} cents is waiting for you.",
        p.order.id,
        p.items.len(),
        p.order.total_price_cents
      ),
      Some(format!("/seller/orders/{}", p.order.id)),
    )
    .await?;
  }
  info!(%customer_id, orders = placed.len(), "Checkout parties notified.");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn line(seller: Uuid, qty: i64) -> CheckoutLine {
    CheckoutLine {
      product_id: Uuid::new_v4(),
      quantity: qty,
      seller_id: Some(seller),
      unit_price_cents: 100,
    }
  }

  #[test]
  fn groups_keep_first_appearance_order() {
    let (s1, s2) = (Uuid::new_v4(), Uuid::new_v4());
    let lines = vec![line(s2, 1), line(s1, 1), line(s2, 3)];
    let groups = partition_by_seller(&lines).unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].seller_id, s2);
    assert_eq!(groups[0].lines.len(), 2);
    assert_eq!(groups[1].seller_id, s1);
  }

  #[test]
  fn missing_seller_is_a_validation_error() {
    let mut bad = line(Uuid::new_v4(), 1);
    bad.seller_id = None;
    let request = CheckoutRequest {
      address: "1 Main St".into(),
      shipping_method: ShippingMethod::Standard,
      items: vec![bad],
    };
    assert!(matches!(validate_request(&request), Err(AppError::Validation(_))));
  }

  #[test]
  fn empty_checkout_and_zero_quantity_are_rejected() {
    let empty = CheckoutRequest {
      address: "1 Main St".into(),
      shipping_method: ShippingMethod::Standard,
      items: vec![],
    };
    assert!(matches!(validate_request(&empty), Err(AppError::Validation(_))));

    let zero = CheckoutRequest {
      items: vec![line(Uuid::new_v4(), 0)],
      ..empty
    };
    assert!(matches!(validate_request(&zero), Err(AppError::Validation(_))));
  }
}
