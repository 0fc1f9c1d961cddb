// marketplace/tests/catalog_review_tests.rs

mod common;

use chrono::{Duration, Utc};
use common::world;
use marketplace::errors::AppError;
use marketplace::models::ApprovalStatus;
use marketplace::services::catalog::{self, ApprovalDecision, ProductDraft, ProductPatch};
use marketplace::services::reviews::{self, ReviewInput};

fn draft(name: &str) -> ProductDraft {
  ProductDraft {
    name: name.to_string(),
    description: "handmade".to_string(),
    price_cents: 1000,
    stock: 12,
    ..ProductDraft::default()
  }
}

#[tokio::test]
async fn new_products_wait_for_approval_and_alert_admins() {
  let w = world().await;
  let product = catalog::create_product(w.store(), &w.seller_a, draft("Vase")).await.unwrap();
  assert_eq!(product.approval_status, ApprovalStatus::Pending);

  let admin_notes = w.notifications_of(&w.admin).await;
  assert!(admin_notes.iter().any(|n| n.title == "Product awaiting approval"));

  // Hidden from the public until approved.
  let err = catalog::get_product(w.store(), None, product.id).await.unwrap_err();
  assert!(matches!(err, AppError::NotFound(_)));
  catalog::get_product(w.store(), Some(&w.seller_a), product.id).await.unwrap();
  catalog::get_product(w.store(), Some(&w.admin), product.id).await.unwrap();
  assert!(catalog::list_public(w.store()).await.unwrap().iter().all(|p| p.id != product.id));

  let approved = catalog::review_product(w.store(), &w.admin, product.id, ApprovalDecision::Approve)
    .await
    .unwrap();
  assert_eq!(approved.approval_status, ApprovalStatus::Approved);
  catalog::get_product(w.store(), None, product.id).await.unwrap();
  assert!(w.notifications_of(&w.seller_a).await.iter().any(|n| n.title == "Product approved"));
}

#[tokio::test]
async fn customers_cannot_create_and_sellers_cannot_approve() {
  let w = world().await;
  let err = catalog::create_product(w.store(), &w.customer, draft("Vase")).await.unwrap_err();
  assert!(matches!(err, AppError::Permission(_)));

  let product = catalog::create_product(w.store(), &w.seller_a, draft("Vase")).await.unwrap();
  let err = catalog::review_product(w.store(), &w.seller_a, product.id, ApprovalDecision::Approve)
    .await
    .unwrap_err();
  assert!(matches!(err, AppError::Permission(_)));
}

#[tokio::test]
async fn any_edit_sends_the_product_back_to_review() {
  let w = world().await;
  let product = w.product(&w.seller_a, "Bowl", 800, 5).await;

  let edited = catalog::update_product(
    w.store(),
    &w.seller_a,
    product.id,
    ProductPatch {
      stock: Some(9),
      ..ProductPatch::default()
    },
  )
  .await
  .unwrap();
  assert_eq!(edited.stock, 9);
  assert_eq!(edited.approval_status, ApprovalStatus::Pending);

  let err = catalog::update_product(w.store(), &w.seller_b, product.id, ProductPatch::default())
    .await
    .unwrap_err();
  assert!(matches!(err, AppError::Permission(_)));
}

#[tokio::test]
async fn discounts_need_a_window_and_a_sane_amount() {
  let w = world().await;
  let now = Utc::now();

  let mut no_window = draft("Plate");
  no_window.discount_percent = Some(10);
  let err = catalog::create_product(w.store(), &w.seller_a, no_window).await.unwrap_err();
  assert!(matches!(err, AppError::Validation(_)));

  let mut too_deep = draft("Plate");
  too_deep.discount_percent = Some(150);
  too_deep.discount_start = Some(now - Duration::days(1));
  too_deep.discount_end = Some(now + Duration::days(1));
  let err = catalog::create_product(w.store(), &w.seller_a, too_deep).await.unwrap_err();
  assert!(matches!(err, AppError::Validation(_)));

  let mut ok = draft("Plate");
  ok.discount_percent = Some(25);
  ok.discount_start = Some(now - Duration::days(1));
  ok.discount_end = Some(now + Duration::days(1));
  let product = catalog::create_product(w.store(), &w.seller_a, ok).await.unwrap();
  assert_eq!(product.effective_price_at(now), 750);
}

#[tokio::test]
async fn reviews_keep_the_product_rating_current() {
  let w = world().await;
  let product = w.product(&w.seller_a, "Cup", 500, 5).await;
  let other = w.user("olga").await;

  let mine = reviews::create(w.store(), &w.customer, product.id, ReviewInput { rating: 5, comment: "great".into() })
    .await
    .unwrap();
  reviews::create(w.store(), &other, product.id, ReviewInput { rating: 4, comment: String::new() })
    .await
    .unwrap();
  let p = catalog::get_product(w.store(), None, product.id).await.unwrap();
  assert_eq!(p.review_count, 2);
  assert_eq!(p.average_rating, 4.5);

  let err = reviews::create(w.store(), &w.customer, product.id, ReviewInput { rating: 3, comment: String::new() })
    .await
    .unwrap_err();
  assert!(matches!(err, AppError::Validation(_)), "second review by the same user: {:?}", err);

  reviews::update(w.store(), &w.customer, mine.id, ReviewInput { rating: 2, comment: "broke".into() })
    .await
    .unwrap();
  let p = catalog::get_product(w.store(), None, product.id).await.unwrap();
  assert_eq!(p.average_rating, 3.0);

  let err = reviews::update(w.store(), &other, mine.id, ReviewInput { rating: 1, comment: String::new() })
    .await
    .unwrap_err();
  assert!(matches!(err, AppError::Permission(_)));

  reviews::delete(w.store(), &w.admin, mine.id).await.unwrap();
  let p = catalog::get_product(w.store(), None, product.id).await.unwrap();
  assert_eq!(p.review_count, 1);
  assert_eq!(p.average_rating, 4.0);
  assert_eq!(reviews::list_for_product(w.store(), product.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn ratings_outside_one_to_five_are_rejected() {
  let w = world().await;
  let product = w.product(&w.seller_a, "Cup", 500, 5).await;
  for rating in [0, 6] {
    let err = reviews::create(w.store(), &w.customer, product.id, ReviewInput { rating, comment: String::new() })
      .await
      .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
  }
}
