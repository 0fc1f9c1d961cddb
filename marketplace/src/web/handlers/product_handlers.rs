// marketplace/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::services::accounts;
use crate::services::catalog::{self, ApprovalDecision, ProductDraft, ProductPatch};
use crate::state::AppState;
use crate::web::auth::AuthenticatedUser;

#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let products = catalog::list_public(app_state.store.as_ref()).await?;
  info!("Fetched {} public products.", products.len());
  Ok(HttpResponse::Ok().json(json!({
      "message": "Products fetched successfully.",
      "products": products
  })))
}

#[instrument(name = "handler::get_product", skip(app_state, path, auth_user), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: Option<AuthenticatedUser>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let viewer = match auth_user {
    Some(user) => Some(accounts::load_actor(app_state.store.as_ref(), user.user_id).await?),
    None => None,
  };
  let product = catalog::get_product(app_state.store.as_ref(), viewer.as_ref(), product_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "product": product })))
}

#[instrument(name = "handler::create_product", skip(app_state, payload), fields(user_id = %auth_user.user_id))]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<ProductDraft>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let actor = accounts::load_actor(app_state.store.as_ref(), auth_user.user_id).await?;
  let product = catalog::create_product(app_state.store.as_ref(), &actor, payload.into_inner()).await?;
  Ok(HttpResponse::Created().json(json!({
      "message": "Product submitted for approval.",
      "product": product
  })))
}

#[instrument(name = "handler::update_product", skip(app_state, path, payload), fields(user_id = %auth_user.user_id, product_id = %path.as_ref()))]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<ProductPatch>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let actor = accounts::load_actor(app_state.store.as_ref(), auth_user.user_id).await?;
  let product = catalog::update_product(app_state.store.as_ref(), &actor, path.into_inner(), payload.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({
      "message": "Product updated and sent back for approval.",
      "product": product
  })))
}

#[derive(Deserialize, Debug)]
pub struct ApprovalPayload {
  pub decision: ApprovalDecision,
}

#[instrument(name = "handler::review_product", skip(app_state, path, payload), fields(user_id = %auth_user.user_id, product_id = %path.as_ref()))]
pub async fn review_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<ApprovalPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let actor = accounts::load_actor(app_state.store.as_ref(), auth_user.user_id).await?;
  let product = catalog::review_product(app_state.store.as_ref(), &actor, path.into_inner(), payload.decision).await?;
  Ok(HttpResponse::Ok().json(json!({ "product": product })))
}

#[instrument(name = "handler::seller_products", skip(app_state), fields(user_id = %auth_user.user_id))]
pub async fn seller_products_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let actor = accounts::load_actor(app_state.store.as_ref(), auth_user.user_id).await?;
  let products = catalog::list_for_seller(app_state.store.as_ref(), &actor).await?;
  Ok(HttpResponse::Ok().json(json!({ "products": products })))
}
