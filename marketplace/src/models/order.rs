// marketplace/src/models/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Confirmed,
  Shipped,
  Delivered,
  Canceled,
}

/// Every permitted (from, to) move. Anything else, including leaving
/// `delivered` or `canceled`, is rejected. Re-setting the current status is
/// handled separately as a no-op.
const TRANSITIONS: &[(OrderStatus, OrderStatus)] = &[
  (OrderStatus::Pending, OrderStatus::Confirmed),
  (OrderStatus::Pending, OrderStatus::Canceled),
  (OrderStatus::Confirmed, OrderStatus::Shipped),
  (OrderStatus::Confirmed, OrderStatus::Delivered), // store pickup
  (OrderStatus::Confirmed, OrderStatus::Canceled),
  (OrderStatus::Shipped, OrderStatus::Delivered),
  (OrderStatus::Shipped, OrderStatus::Canceled),
];

impl OrderStatus {
  pub fn is_terminal(self) -> bool {
    matches!(self, OrderStatus::Delivered | OrderStatus::Canceled)
  }

  pub fn can_transition_to(self, next: OrderStatus) -> bool {
    TRANSITIONS.iter().any(|&(from, to)| from == self && to == next)
  }

  pub fn as_str(self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Confirmed => "confirmed",
      OrderStatus::Shipped => "shipped",
      OrderStatus::Delivered => "delivered",
      OrderStatus::Canceled => "canceled",
    }
  }
}

impl std::fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "shipping_method", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ShippingMethod {
  Standard,
  Express,
  Pickup,
}

impl Default for ShippingMethod {
  fn default() -> Self {
    ShippingMethod::Standard
  }
}

/// One seller's share of a checkout.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
  pub id: Uuid,
  pub customer_id: Uuid,
  pub seller_id: Uuid,
  pub status: OrderStatus,
  /// Items plus shipping, fixed at creation.
  pub total_price_cents: i64,
  pub shipping_method: ShippingMethod,
  pub shipping_cost_cents: i64,
  /// Copied from the checkout request.
  pub address: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::OrderStatus::*;

  #[test]
  fn forward_path_is_allowed() {
    assert!(Pending.can_transition_to(Confirmed));
    assert!(Confirmed.can_transition_to(Shipped));
    assert!(Shipped.can_transition_to(Delivered));
  }

  #[test]
  fn cancel_from_every_open_state() {
    for from in [Pending, Confirmed, Shipped] {
      assert!(from.can_transition_to(Canceled), "{} -> canceled", from);
    }
  }

  #[test]
  fn terminal_states_have_no_exit() {
    for from in [Delivered, Canceled] {
      assert!(from.is_terminal());
      for to in [Pending, Confirmed, Shipped, Delivered, Canceled] {
        assert!(!from.can_transition_to(to), "{} -> {}", from, to);
      }
    }
  }

  #[test]
  fn backwards_moves_are_rejected() {
    assert!(!Shipped.can_transition_to(Confirmed));
    assert!(!Confirmed.can_transition_to(Pending));
    assert!(!Pending.can_transition_to(Delivered));
  }
}
