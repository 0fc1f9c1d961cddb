// marketplace/src/models/order_item.rs

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItem {
  pub id: Uuid,
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i64,
  /// Sale price when the order was placed; later price edits do not touch it.
  pub unit_price_cents: i64,
}

impl OrderItem {
  pub fn line_total_cents(&self) -> i64 {
    self.unit_price_cents * self.quantity
  }
}
