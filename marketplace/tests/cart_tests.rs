// marketplace/tests/cart_tests.rs

mod common;

use common::world;
use marketplace::errors::AppError;
use marketplace::pipelines::cart_pipeline::add_to_cart;
use marketplace::services::cart;
use marketplace::services::catalog::{self, ProductDraft};
use uuid::Uuid;

#[tokio::test]
async fn adding_twice_accumulates_one_line() {
  let w = world().await;
  let p = w.product(&w.seller_a, "Tea", 250, 10).await;

  let first = add_to_cart(&w.state, w.customer.user_id, p.id, 2).await.unwrap();
  let second = add_to_cart(&w.state, w.customer.user_id, p.id, 3).await.unwrap();
  assert_eq!(first.id, second.id);
  assert_eq!(second.quantity, 5);

  let view = cart::view(w.store(), w.customer.user_id).await.unwrap();
  assert_eq!(view.items.len(), 1);
  assert_eq!(view.total_cents, 1250);
  // Adding to the cart never reserves stock.
  assert_eq!(w.stock_of(p.id).await, 10);
}

#[tokio::test]
async fn cart_cannot_hold_more_than_stock() {
  let w = world().await;
  let p = w.product(&w.seller_a, "Tea", 250, 4).await;

  add_to_cart(&w.state, w.customer.user_id, p.id, 3).await.unwrap();
  let err = add_to_cart(&w.state, w.customer.user_id, p.id, 2).await.unwrap_err();
  assert!(matches!(err, AppError::Validation(ref m) if m.contains("Only 4 available")), "got {:?}", err);

  let view = cart::view(w.store(), w.customer.user_id).await.unwrap();
  assert_eq!(view.items[0].item.quantity, 3);
}

#[tokio::test]
async fn bad_input_is_rejected() {
  let w = world().await;
  let p = w.product(&w.seller_a, "Tea", 250, 4).await;

  for qty in [0, -1] {
    let err = add_to_cart(&w.state, w.customer.user_id, p.id, qty).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "got {:?}", err);
  }

  let err = add_to_cart(&w.state, w.customer.user_id, Uuid::new_v4(), 1).await.unwrap_err();
  assert!(matches!(err, AppError::NotFound(_)), "got {:?}", err);
}

#[tokio::test]
async fn unapproved_products_cannot_be_added() {
  let w = world().await;
  let pending = catalog::create_product(
    w.store(),
    &w.seller_a,
    ProductDraft {
      name: "Prototype".into(),
      price_cents: 100,
      stock: 3,
      ..ProductDraft::default()
    },
  )
  .await
  .unwrap();

  let err = add_to_cart(&w.state, w.customer.user_id, pending.id, 1).await.unwrap_err();
  assert!(matches!(err, AppError::Validation(_)), "got {:?}", err);
}

#[tokio::test]
async fn quantity_can_be_set_and_items_removed_by_owner_only() {
  let w = world().await;
  let p = w.product(&w.seller_a, "Tea", 250, 10).await;
  let item = add_to_cart(&w.state, w.customer.user_id, p.id, 2).await.unwrap();

  let updated = cart::set_quantity(w.store(), w.customer.user_id, item.id, 7).await.unwrap();
  assert_eq!(updated.quantity, 7);

  let err = cart::set_quantity(w.store(), w.customer.user_id, item.id, 0).await.unwrap_err();
  assert!(matches!(err, AppError::Validation(_)));

  let stranger = w.user("mallory").await;
  let err = cart::set_quantity(w.store(), stranger.user_id, item.id, 1).await.unwrap_err();
  assert!(matches!(err, AppError::NotFound(_)), "got {:?}", err);
  let err = cart::remove_item(w.store(), stranger.user_id, item.id).await.unwrap_err();
  assert!(matches!(err, AppError::NotFound(_)), "got {:?}", err);

  cart::remove_item(w.store(), w.customer.user_id, item.id).await.unwrap();
  let view = cart::view(w.store(), w.customer.user_id).await.unwrap();
  assert!(view.items.is_empty());
  assert_eq!(view.total_cents, 0);
}

#[tokio::test]
async fn empty_cart_view_has_no_cart() {
  let w = world().await;
  let view = cart::view(w.store(), w.customer.user_id).await.unwrap();
  assert!(view.cart_id.is_none());
  assert!(view.items.is_empty());
}

#[tokio::test]
async fn setting_quantity_is_held_to_stock() {
  let w = world().await;
  let p = w.product(&w.seller_a, "Tea", 250, 10).await;
  let item = add_to_cart(&w.state, w.customer.user_id, p.id, 1).await.unwrap();

  let err = cart::set_quantity(w.store(), w.customer.user_id, item.id, i64::MAX / 2)
    .await
    .unwrap_err();
  assert!(matches!(err, AppError::Validation(ref m) if m.contains("Only 10 available")), "got {:?}", err);
  cart::set_quantity(w.store(), w.customer.user_id, item.id, 10).await.unwrap();

  let view = cart::view(w.store(), w.customer.user_id).await.unwrap();
  assert_eq!(view.total_cents, 2_500);
}

#[tokio::test]
async fn oversized_cart_total_is_an_error_not_a_crash() {
  let w = world().await;
  let p = w.product(&w.seller_a, "Tea", 250, 10).await;
  let item = add_to_cart(&w.state, w.customer.user_id, p.id, 1).await.unwrap();

  // Stock checks only run on writes through the service; a line can still
  // end up larger than the shelf, e.g. after a stock correction.
  let mut tx = w.store().begin().await.unwrap();
  tx.update_cart_item_quantity(item.id, i64::MAX / 2, chrono::Utc::now()).await.unwrap();
  tx.commit().await.unwrap();

  let err = cart::view(w.store(), w.customer.user_id).await.unwrap_err();
  assert!(matches!(err, AppError::Validation(_)), "got {:?}", err);
}

#[tokio::test]
async fn huge_add_does_not_overflow_the_stock_check() {
  let w = world().await;
  let p = w.product(&w.seller_a, "Tea", 250, 10).await;
  add_to_cart(&w.state, w.customer.user_id, p.id, 2).await.unwrap();
  let err = add_to_cart(&w.state, w.customer.user_id, p.id, i64::MAX).await.unwrap_err();
  assert!(matches!(err, AppError::Validation(_)), "got {:?}", err);
}
