// marketplace/tests/http_tests.rs

mod common;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use common::{world, World};
use marketplace::web::auth::USER_ID_HEADER;
use marketplace::web::routes::configure_app_routes;
use serde_json::{json, Value};

macro_rules! app {
  ($state:expr) => {
    test::init_service(
      App::new()
        .app_data(web::Data::new($state.clone()))
        .configure(configure_app_routes),
    )
    .await
  };
}

#[actix_rt::test]
async fn health_check_needs_no_user() {
  let w = world().await;
  let app = app!(w.state);
  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/v1/health").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn missing_user_header_is_unauthorized() {
  let w = world().await;
  let app = app!(w.state);
  let req = test::TestRequest::get().uri("/api/v1/orders").to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["code"], "auth_error");
}

#[actix_rt::test]
async fn checkout_over_http_splits_per_seller() {
  let w = world().await;
  let p1 = w.product(&w.seller_a, "Pen", 100, 10).await;
  let p2 = w.product(&w.seller_b, "Ink", 50, 10).await;
  let app = app!(w.state);

  let req = test::TestRequest::post()
    .uri("/api/v1/checkout")
    .insert_header((USER_ID_HEADER, w.customer.user_id.to_string()))
    .set_json(json!({
      "address": "1 Main St",
      "shipping_method": "standard",
      "items": [
        {"product_id": p1.id, "quantity": 2, "seller_id": World::seller_id(&w.seller_a), "unit_price_cents": 100},
        {"product_id": p2.id, "quantity": 1, "seller_id": World::seller_id(&w.seller_b), "unit_price_cents": 50}
      ]
    }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["orders"].as_array().map(Vec::len), Some(2));

  let req = test::TestRequest::get()
    .uri("/api/v1/orders")
    .insert_header((USER_ID_HEADER, w.customer.user_id.to_string()))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["orders"].as_array().map(Vec::len), Some(2));
}

#[actix_rt::test]
async fn domain_errors_carry_status_and_code() {
  let w = world().await;
  let p = w.product(&w.seller_a, "Pen", 100, 10).await;
  let app = app!(w.state);

  let req = test::TestRequest::post()
    .uri("/api/v1/cart/items")
    .insert_header((USER_ID_HEADER, w.customer.user_id.to_string()))
    .set_json(json!({"product_id": p.id, "quantity": 0}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["code"], "validation_error");

  let req = test::TestRequest::get()
    .uri(&format!("/api/v1/orders/{}", uuid::Uuid::new_v4()))
    .insert_header((USER_ID_HEADER, w.customer.user_id.to_string()))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn illegal_status_change_is_a_conflict() {
  let w = world().await;
  let p = w.product(&w.seller_a, "Pen", 100, 10).await;
  let app = app!(w.state);

  let req = test::TestRequest::post()
    .uri("/api/v1/checkout")
    .insert_header((USER_ID_HEADER, w.customer.user_id.to_string()))
    .set_json(json!({
      "address": "1 Main St",
      "items": [{"product_id": p.id, "quantity": 1, "seller_id": World::seller_id(&w.seller_a), "unit_price_cents": 100}]
    }))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  let order_id = body["orders"][0]["id"].as_str().unwrap().to_string();

  let req = test::TestRequest::patch()
    .uri(&format!("/api/v1/orders/{}/status", order_id))
    .insert_header((USER_ID_HEADER, w.seller_a.user_id.to_string()))
    .set_json(json!({"status": "delivered"}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["code"], "invalid_state_transition");
  assert_eq!(body["from"], "pending");
  assert_eq!(body["to"], "delivered");
}

#[actix_rt::test]
async fn webhook_acknowledges_payment() {
  let w = world().await;
  let p = w.product(&w.seller_a, "Pen", 100, 10).await;
  let app = app!(w.state);

  let req = test::TestRequest::post()
    .uri("/api/v1/checkout")
    .insert_header((USER_ID_HEADER, w.customer.user_id.to_string()))
    .set_json(json!({
      "address": "1 Main St",
      "items": [{"product_id": p.id, "quantity": 1, "seller_id": World::seller_id(&w.seller_a), "unit_price_cents": 100}]
    }))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  let order_id = body["orders"][0]["id"].as_str().unwrap().to_string();

  let req = test::TestRequest::post()
    .uri("/api/v1/webhooks/stripe")
    .set_payload(format!(r#"{{"event_type": "payment_succeeded", "order_id": "{}"}}"#, order_id))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["status"], "received");
  assert_eq!(body["result"]["outcome"], "applied");
  assert_eq!(body["result"]["status"], "confirmed");
}
