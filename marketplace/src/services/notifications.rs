// marketplace/src/services/notifications.rs

//! Append-only notification log. Delivery (push, email) is someone else's
//! job; only the record is kept here.

use crate::errors::{AppError, Result as AppResult};
use crate::models::{Actor, Notification, Recipient, Role};
use crate::store::{Store, StoreTx};
use serde::Deserialize;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Appends a notification inside the caller's transaction.
pub async fn create(
  tx: &mut dyn StoreTx,
  recipient: Recipient,
  title: impl Into<String>,
  message: impl Into<String>,
  link: Option<String>,
) -> AppResult<Notification> {
  let notification = Notification::new(recipient, title, message, link);
  tx.insert_notification(&notification).await?;
  debug!(notification_id = %notification.id, ?recipient, "Notification recorded.");
  Ok(notification)
}

#[derive(Debug, Clone, Deserialize)]
pub struct Broadcast {
  pub recipient_user_id: Option<Uuid>,
  pub recipient_role: Option<Role>,
  pub title: String,
  pub message: String,
  pub link: Option<String>,
}

/// Admin-authored notification to one user or to everyone with a role.
#[instrument(name = "notifications::broadcast", skip(store, broadcast), fields(actor = %actor.user_id), err)]
pub async fn broadcast(store: &dyn Store, actor: &Actor, broadcast: Broadcast) -> AppResult<Notification> {
  if !actor.is_admin() {
    return Err(AppError::Permission("Only admins can send notifications.".to_string()));
  }
  let recipient = Recipient::from_parts(broadcast.recipient_user_id, broadcast.recipient_role)?;
  if broadcast.title.trim().is_empty() {
    return Err(AppError::Validation("Notification title must not be empty.".to_string()));
  }

  let mut tx = store.begin().await?;
  if let Recipient::User(user_id) = recipient {
    if tx.get_user(user_id).await?.is_none() {
      return Err(AppError::NotFound(format!("User with ID {} not found.", user_id)));
    }
  }
  let notification = create(tx.as_mut(), recipient, broadcast.title, broadcast.message, broadcast.link).await?;
  tx.commit().await?;
  info!(notification_id = %notification.id, "Broadcast notification created.");
  Ok(notification)
}

/// Everything addressed to the actor, directly or through their role,
/// newest first.
pub async fn list_for(store: &dyn Store, actor: &Actor) -> AppResult<Vec<Notification>> {
  let mut tx = store.begin().await?;
  tx.notifications_for(actor.user_id, actor.role).await
}

#[instrument(name = "notifications::mark_read", skip(store), fields(actor = %actor.user_id), err)]
pub async fn mark_read(store: &dyn Store, actor: &Actor, notification_id: Uuid) -> AppResult<Notification> {
  let mut tx = store.begin().await?;
  let mut notification = tx
    .get_notification(notification_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Notification with ID {} not found.", notification_id)))?;
  if !notification.is_addressed_to(actor) {
    return Err(AppError::Permission(
      "This notification is not addressed to you.".to_string(),
    ));
  }
  if !notification.is_read {
    tx.mark_notification_read(notification.id).await?;
    tx.commit().await?;
    notification.is_read = true;
  }
  Ok(notification)
}
