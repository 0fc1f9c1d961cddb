// marketplace/src/web/handlers/notification_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::services::accounts;
use crate::services::notifications::{self, Broadcast};
use crate::state::AppState;
use crate::web::auth::AuthenticatedUser;

#[instrument(name = "handler::list_notifications", skip(app_state), fields(user_id = %auth_user.user_id))]
pub async fn list_notifications_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let actor = accounts::load_actor(app_state.store.as_ref(), auth_user.user_id).await?;
  let notifications = notifications::list_for(app_state.store.as_ref(), &actor).await?;
  let unread = notifications.iter().filter(|n| !n.is_read).count();
  Ok(HttpResponse::Ok().json(json!({
      "notifications": notifications,
      "unread": unread
  })))
}

#[instrument(name = "handler::broadcast_notification", skip(app_state, payload), fields(user_id = %auth_user.user_id))]
pub async fn broadcast_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<Broadcast>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let actor = accounts::load_actor(app_state.store.as_ref(), auth_user.user_id).await?;
  let notification = notifications::broadcast(app_state.store.as_ref(), &actor, payload.into_inner()).await?;
  Ok(HttpResponse::Created().json(json!({ "notification": notification })))
}

#[instrument(name = "handler::mark_notification_read", skip(app_state, path), fields(user_id = %auth_user.user_id))]
pub async fn mark_read_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let actor = accounts::load_actor(app_state.store.as_ref(), auth_user.user_id).await?;
  let notification = notifications::mark_read(app_state.store.as_ref(), &actor, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "notification": notification })))
}
