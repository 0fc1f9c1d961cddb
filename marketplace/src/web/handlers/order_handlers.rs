// marketplace/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::OrderStatus;
use crate::pipelines::fulfillment_pipeline;
use crate::services::{accounts, orders};
use crate::state::AppState;
use crate::web::auth::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct StatusPayload {
  pub status: OrderStatus,
}

#[instrument(name = "handler::customer_orders", skip(app_state), fields(user_id = %auth_user.user_id))]
pub async fn customer_orders_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let actor = accounts::load_actor(app_state.store.as_ref(), auth_user.user_id).await?;
  let orders = orders::list_for_customer(app_state.store.as_ref(), &actor).await?;
  Ok(HttpResponse::Ok().json(json!({ "orders": orders })))
}

#[instrument(name = "handler::seller_orders", skip(app_state), fields(user_id = %auth_user.user_id))]
pub async fn seller_orders_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let actor = accounts::load_actor(app_state.store.as_ref(), auth_user.user_id).await?;
  let orders = orders::list_for_seller(app_state.store.as_ref(), &actor).await?;
  Ok(HttpResponse::Ok().json(json!({ "orders": orders })))
}

#[instrument(name = "handler::order_detail", skip(app_state, path), fields(user_id = %auth_user.user_id, order_id = %path.as_ref()))]
pub async fn order_detail_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let actor = accounts::load_actor(app_state.store.as_ref(), auth_user.user_id).await?;
  let detail = orders::detail(app_state.store.as_ref(), &actor, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "order": detail })))
}

#[instrument(name = "handler::update_order_status", skip(app_state, path, payload), fields(user_id = %auth_user.user_id, order_id = %path.as_ref(), status = %payload.status))]
pub async fn update_status_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<StatusPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let change =
    fulfillment_pipeline::update_status(app_state.get_ref(), auth_user.user_id, path.into_inner(), payload.status).await?;
  Ok(HttpResponse::Ok().json(json!({
      "order": change.order,
      "changed": change.changed,
      "lowStock": change.low_stock
  })))
}
