// marketplace/src/models/product.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "approval_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
  Pending,
  Approved,
  Rejected,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
  pub id: Uuid,
  pub seller_id: Uuid,
  pub name: String,
  pub description: String,
  pub price_cents: i64,
  pub stock: i64,
  pub approval_status: ApprovalStatus,
  pub is_active: bool,
  // Discount window: exactly one of percent / fixed price, both bounds set.
  pub discount_percent: Option<i32>,
  pub discount_price_cents: Option<i64>,
  pub discount_start: Option<DateTime<Utc>>,
  pub discount_end: Option<DateTime<Utc>>,
  pub average_rating: f64,
  pub review_count: i64,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Product {
  pub fn discount_is_valid(&self) -> bool {
    let value_ok = match (self.discount_percent, self.discount_price_cents) {
      (Some(percent), None) => (1..=100).contains(&percent),
      (None, Some(price)) => price >= 0 && price < self.price_cents,
      _ => false,
    };
    let window_ok = matches!((self.discount_start, self.discount_end), (Some(start), Some(end)) if start <= end);
    value_ok && window_ok
  }

  pub fn discount_active_at(&self, now: DateTime<Utc>) -> bool {
    if !self.discount_is_valid() {
      return false;
    }
    match (self.discount_start, self.discount_end) {
      (Some(start), Some(end)) => start <= now && now <= end,
      _ => false,
    }
  }

  /// Sale price at `now`. Percent discounts round down to the minor unit.
  pub fn effective_price_at(&self, now: DateTime<Utc>) -> i64 {
    if !self.discount_active_at(now) {
      return self.price_cents;
    }
    match (self.discount_percent, self.discount_price_cents) {
      // i128 product; the result never exceeds the list price.
      (Some(percent), _) => {
        let discounted = i128::from(self.price_cents) * i128::from(100 - percent) / 100;
        i64::try_from(discounted).unwrap_or(self.price_cents)
      }
      (None, Some(price)) => price,
      (None, None) => self.price_cents,
    }
  }

  pub fn is_purchasable(&self) -> bool {
    self.is_active && self.approval_status == ApprovalStatus::Approved
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Duration;

  fn product(price_cents: i64) -> Product {
    let now = Utc::now();
    Product {
      id: Uuid::new_v4(),
      seller_id: Uuid::new_v4(),
      name: "Lamp".into(),
      description: String::new(),
      price_cents,
      stock: 10,
      approval_status: ApprovalStatus::Approved,
      is_active: true,
      discount_percent: None,
      discount_price_cents: None,
      discount_start: None,
      discount_end: None,
      average_rating: 0.0,
      review_count: 0,
      created_at: now,
      updated_at: now,
    }
  }

  #[test]
  fn list_price_without_discount() {
    let p = product(1_000);
    assert_eq!(p.effective_price_at(Utc::now()), 1_000);
  }

  #[test]
  fn percent_discount_applies_inside_window_only() {
    let now = Utc::now();
    let mut p = product(1_000);
    p.discount_percent = Some(25);
    p.discount_start = Some(now - Duration::hours(1));
    p.discount_end = Some(now + Duration::hours(1));
    assert_eq!(p.effective_price_at(now), 750);
    assert_eq!(p.effective_price_at(now + Duration::hours(2)), 1_000);
    assert_eq!(p.effective_price_at(now - Duration::hours(2)), 1_000);
  }

  #[test]
  fn fixed_discount_must_be_below_list_price() {
    let now = Utc::now();
    let mut p = product(1_000);
    p.discount_price_cents = Some(800);
    p.discount_start = Some(now - Duration::hours(1));
    p.discount_end = Some(now + Duration::hours(1));
    assert_eq!(p.effective_price_at(now), 800);

    p.discount_price_cents = Some(1_200);
    assert!(!p.discount_is_valid());
    assert_eq!(p.effective_price_at(now), 1_000);
  }

  #[test]
  fn percent_discount_on_largest_price_does_not_overflow() {
    let now = Utc::now();
    let mut p = product(i64::MAX);
    p.discount_percent = Some(10);
    p.discount_start = Some(now - Duration::hours(1));
    p.discount_end = Some(now + Duration::hours(1));
    let expected = (i128::from(i64::MAX) * 90 / 100) as i64;
    assert_eq!(p.effective_price_at(now), expected);
  }

  #[test]
  fn ambiguous_or_open_discount_is_ignored() {
    let now = Utc::now();
    let mut p = product(1_000);
    p.discount_percent = Some(10);
    p.discount_price_cents = Some(500);
    p.discount_start = Some(now - Duration::hours(1));
    p.discount_end = Some(now + Duration::hours(1));
    assert_eq!(p.effective_price_at(now), 1_000);

    p.discount_price_cents = None;
    p.discount_end = None;
    assert_eq!(p.effective_price_at(now), 1_000);
  }
}
