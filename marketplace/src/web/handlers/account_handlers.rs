// marketplace/src/web/handlers/account_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::instrument;

use crate::errors::AppError;
use crate::services::accounts::{self, SellerRegistration};
use crate::state::AppState;
use crate::web::auth::AuthenticatedUser;

#[instrument(name = "handler::register_seller", skip(app_state, payload), fields(user_id = %auth_user.user_id))]
pub async fn register_seller_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<SellerRegistration>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let seller = accounts::register_seller(app_state.store.as_ref(), auth_user.user_id, payload.into_inner()).await?;
  Ok(HttpResponse::Created().json(json!({
      "message": "Seller profile created.",
      "seller": seller
  })))
}
