// marketplace/src/services/orders.rs

use crate::errors::{AppError, Result as AppResult};
use crate::models::{Actor, Order, OrderItem};
use crate::store::Store;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
  #[serde(flatten)]
  pub order: Order,
  pub items: Vec<OrderItem>,
}

pub async fn list_for_customer(store: &dyn Store, actor: &Actor) -> AppResult<Vec<Order>> {
  let mut tx = store.begin().await?;
  tx.orders_for_customer(actor.user_id).await
}

pub async fn list_for_seller(store: &dyn Store, actor: &Actor) -> AppResult<Vec<Order>> {
  let seller_id = actor
    .seller_id
    .ok_or_else(|| AppError::Permission("Only sellers have incoming orders.".to_string()))?;
  let mut tx = store.begin().await?;
  tx.orders_for_seller(seller_id).await
}

/// Visible to the buyer, the order's seller and admins.
pub async fn detail(store: &dyn Store, actor: &Actor, order_id: Uuid) -> AppResult<OrderDetail> {
  let mut tx = store.begin().await?;
  let order = tx
    .get_order(order_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Order with ID {} not found.", order_id)))?;
  if order.customer_id != actor.user_id && !actor.is_seller(order.seller_id) && !actor.is_admin() {
    return Err(AppError::Permission("You cannot view this order.".to_string()));
  }
  let items = tx.order_items(order.id).await?;
  Ok(OrderDetail { order, items })
}
