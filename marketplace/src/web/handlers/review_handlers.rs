// marketplace/src/web/handlers/review_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::services::accounts;
use crate::services::reviews::{self, ReviewInput};
use crate::state::AppState;
use crate::web::auth::AuthenticatedUser;

#[instrument(name = "handler::list_reviews", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn list_reviews_handler(app_state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
  let reviews = reviews::list_for_product(app_state.store.as_ref(), path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "reviews": reviews })))
}

#[instrument(name = "handler::create_review", skip(app_state, path, payload), fields(user_id = %auth_user.user_id, product_id = %path.as_ref()))]
pub async fn create_review_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<ReviewInput>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let actor = accounts::load_actor(app_state.store.as_ref(), auth_user.user_id).await?;
  let review = reviews::create(app_state.store.as_ref(), &actor, path.into_inner(), payload.into_inner()).await?;
  Ok(HttpResponse::Created().json(json!({ "review": review })))
}

#[instrument(name = "handler::update_review", skip(app_state, path, payload), fields(user_id = %auth_user.user_id))]
pub async fn update_review_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<ReviewInput>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let actor = accounts::load_actor(app_state.store.as_ref(), auth_user.user_id).await?;
  let review = reviews::update(app_state.store.as_ref(), &actor, path.into_inner(), payload.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "review": review })))
}

#[instrument(name = "handler::delete_review", skip(app_state, path), fields(user_id = %auth_user.user_id))]
pub async fn delete_review_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let actor = accounts::load_actor(app_state.store.as_ref(), auth_user.user_id).await?;
  reviews::delete(app_state.store.as_ref(), &actor, path.into_inner()).await?;
  Ok(HttpResponse::NoContent().finish())
}
