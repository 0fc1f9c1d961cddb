// marketplace/tests/payment_webhook_tests.rs

mod common;

use actix_web::web::Bytes;
use common::{world, World};
use marketplace::errors::AppError;
use marketplace::models::{Order, OrderStatus, ShippingMethod};
use marketplace::pipelines::{checkout_pipeline, fulfillment_pipeline, webhook_pipeline};
use marketplace::services::order_splitter::{CheckoutLine, CheckoutRequest};
use marketplace::services::orders;
use marketplace::services::payment::PaymentOutcome;
use uuid::Uuid;

async fn pending_order(w: &World) -> Order {
  let p = w.product(&w.seller_a, "Kettle", 40, 10).await;
  let placed = checkout_pipeline::checkout(
    &w.state,
    w.customer.user_id,
    CheckoutRequest {
      address: "9 Mill Lane".into(),
      shipping_method: ShippingMethod::Standard,
      items: vec![CheckoutLine {
        product_id: p.id,
        quantity: 1,
        seller_id: Some(World::seller_id(&w.seller_a)),
        unit_price_cents: 40,
      }],
    },
  )
  .await
  .unwrap();
  placed[0].order.clone()
}

fn payload(event_type: &str, order_id: Uuid) -> Bytes {
  Bytes::from(format!(r#"{{"event_type": "{}", "order_id": "{}"}}"#, event_type, order_id))
}

async fn status_of(w: &World, order_id: Uuid) -> OrderStatus {
  orders::detail(w.store(), &w.admin, order_id).await.unwrap().order.status
}

#[tokio::test]
async fn successful_payment_confirms_pending_order() {
  let w = world().await;
  let order = pending_order(&w).await;

  let outcome = webhook_pipeline::process_webhook(&w.state, "stripe".into(), payload("payment_succeeded", order.id))
    .await
    .unwrap();
  assert_eq!(
    outcome,
    PaymentOutcome::Applied {
      order_id: order.id,
      status: OrderStatus::Confirmed
    }
  );
  assert_eq!(status_of(&w, order.id).await, OrderStatus::Confirmed);
}

#[tokio::test]
async fn failed_payment_cancels_pending_order() {
  let w = world().await;
  let order = pending_order(&w).await;
  let seller_before = w.notifications_of(&w.seller_a).await.len();

  webhook_pipeline::process_webhook(&w.state, "stripe".into(), payload("payment_failed", order.id))
    .await
    .unwrap();
  assert_eq!(status_of(&w, order.id).await, OrderStatus::Canceled);
  assert_eq!(w.notifications_of(&w.seller_a).await.len(), seller_before + 1);
}

#[tokio::test]
async fn events_for_settled_orders_are_ignored() {
  let w = world().await;
  let order = pending_order(&w).await;
  fulfillment_pipeline::update_status(&w.state, w.seller_a.user_id, order.id, OrderStatus::Confirmed)
    .await
    .unwrap();

  let outcome = webhook_pipeline::process_webhook(&w.state, "stripe".into(), payload("payment_failed", order.id))
    .await
    .unwrap();
  assert!(matches!(outcome, PaymentOutcome::Ignored { order_id, .. } if order_id == order.id));
  assert_eq!(status_of(&w, order.id).await, OrderStatus::Confirmed);
}

#[tokio::test]
async fn unknown_event_types_are_ignored() {
  let w = world().await;
  let order = pending_order(&w).await;

  let outcome = webhook_pipeline::process_webhook(&w.state, "stripe".into(), payload("charge_refunded", order.id))
    .await
    .unwrap();
  assert!(matches!(outcome, PaymentOutcome::Ignored { .. }));
  assert_eq!(status_of(&w, order.id).await, OrderStatus::Pending);
}

#[tokio::test]
async fn malformed_payload_is_a_validation_error() {
  let w = world().await;
  let err = webhook_pipeline::process_webhook(&w.state, "stripe".into(), Bytes::from_static(b"{not json"))
    .await
    .unwrap_err();
  assert!(matches!(err, AppError::Validation(_)), "got {:?}", err);

  let err = webhook_pipeline::process_webhook(&w.state, "stripe".into(), Bytes::from_static(br#"{"event_type": "payment_succeeded"}"#))
    .await
    .unwrap_err();
  assert!(matches!(err, AppError::Validation(_)), "got {:?}", err);
}

#[tokio::test]
async fn unknown_order_is_not_found() {
  let w = world().await;
  let err = webhook_pipeline::process_webhook(&w.state, "stripe".into(), payload("payment_succeeded", Uuid::new_v4()))
    .await
    .unwrap_err();
  assert!(matches!(err, AppError::NotFound(_)), "got {:?}", err);
}
