// marketplace/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::pipelines::cart_pipeline;
use crate::services::cart;
use crate::state::AppState;
use crate::web::auth::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct AddToCartRequestPayload {
  pub product_id: Uuid,
  pub quantity: i64,
}

#[derive(Deserialize, Debug)]
pub struct SetQuantityPayload {
  pub quantity: i64,
}

#[instrument(name = "handler::view_cart", skip(app_state), fields(user_id = %auth_user.user_id))]
pub async fn view_cart_handler(app_state: web::Data<AppState>, auth_user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  let view = cart::view(app_state.store.as_ref(), auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "cart": view })))
}

#[instrument(
    name = "handler::add_to_cart",
    skip(app_state, req_payload, auth_user),
    fields(user_id = %auth_user.user_id, product_id = %req_payload.product_id, quantity = %req_payload.quantity)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<AddToCartRequestPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let item = cart_pipeline::add_to_cart(
    app_state.get_ref(),
    auth_user.user_id,
    req_payload.product_id,
    req_payload.quantity,
  )
  .await?;
  info!(
    "Add to cart successful for user: {}. Item ID: {}, New Quantity: {}",
    auth_user.user_id, item.id, item.quantity
  );
  Ok(HttpResponse::Ok().json(json!({
      "message": "Item added to cart successfully.",
      "cartItem": item
  })))
}

#[instrument(name = "handler::set_cart_quantity", skip(app_state, path, payload), fields(user_id = %auth_user.user_id))]
pub async fn set_quantity_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<SetQuantityPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let item = cart::set_quantity(app_state.store.as_ref(), auth_user.user_id, path.into_inner(), payload.quantity).await?;
  Ok(HttpResponse::Ok().json(json!({ "cartItem": item })))
}

#[instrument(name = "handler::remove_cart_item", skip(app_state, path), fields(user_id = %auth_user.user_id))]
pub async fn remove_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  cart::remove_item(app_state.store.as_ref(), auth_user.user_id, path.into_inner()).await?;
  Ok(HttpResponse::NoContent().finish())
}
