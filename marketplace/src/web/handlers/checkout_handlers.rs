// marketplace/src/web/handlers/checkout_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::models::ShippingMethod;
use crate::pipelines::checkout_pipeline;
use crate::services::order_splitter::{CheckoutRequest, OrderSummary, PlacedOrder};
use crate::state::AppState;
use crate::web::auth::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct CartCheckoutPayload {
  pub address: String,
  #[serde(default)]
  pub shipping_method: ShippingMethod,
}

fn created(placed: &[PlacedOrder]) -> HttpResponse {
  let orders: Vec<OrderSummary> = placed.iter().map(OrderSummary::from).collect();
  HttpResponse::Created().json(json!({
      "message": "Checkout completed.",
      "orders": orders
  }))
}

#[instrument(name = "handler::checkout", skip(app_state, payload), fields(user_id = %auth_user.user_id))]
pub async fn start_checkout_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<CheckoutRequest>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let placed = checkout_pipeline::checkout(app_state.get_ref(), auth_user.user_id, payload.into_inner()).await?;
  info!("Checkout for user {} created {} order(s).", auth_user.user_id, placed.len());
  Ok(created(&placed))
}

#[instrument(name = "handler::checkout_cart", skip(app_state, payload), fields(user_id = %auth_user.user_id))]
pub async fn checkout_cart_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<CartCheckoutPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let CartCheckoutPayload {
    address,
    shipping_method,
  } = payload.into_inner();
  let placed = checkout_pipeline::checkout_cart(app_state.get_ref(), auth_user.user_id, address, shipping_method).await?;
  info!("Cart checkout for user {} created {} order(s).", auth_user.user_id, placed.len());
  Ok(created(&placed))
}
