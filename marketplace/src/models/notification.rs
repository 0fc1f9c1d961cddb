// marketplace/src/models/notification.rs

use crate::errors::{AppError, Result};
use crate::models::user::{Actor, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Who a notification is for: one user, or everyone holding a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "lowercase")]
pub enum Recipient {
  User(Uuid),
  Role(Role),
}

impl Recipient {
  /// Exactly one of the two must be given.
  pub fn from_parts(user_id: Option<Uuid>, role: Option<Role>) -> Result<Self> {
    match (user_id, role) {
      (Some(user_id), None) => Ok(Recipient::User(user_id)),
      (None, Some(role)) => Ok(Recipient::Role(role)),
      (None, None) => Err(AppError::Validation(
        "Notification recipient must name a user or a role.".to_string(),
      )),
      (Some(_), Some(_)) => Err(AppError::Validation(
        "Notification recipient cannot be both a user and a role.".to_string(),
      )),
    }
  }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Notification {
  pub id: Uuid,
  pub recipient_user_id: Option<Uuid>,
  pub recipient_role: Option<Role>,
  pub title: String,
  pub message: String,
  pub link: Option<String>,
  pub is_read: bool,
  pub created_at: DateTime<Utc>,
}

impl Notification {
  pub fn new(recipient: Recipient, title: impl Into<String>, message: impl Into<String>, link: Option<String>) -> Self {
    let (recipient_user_id, recipient_role) = match recipient {
      Recipient::User(id) => (Some(id), None),
      Recipient::Role(role) => (None, Some(role)),
    };
    Self {
      id: Uuid::new_v4(),
      recipient_user_id,
      recipient_role,
      title: title.into(),
      message: message.into(),
      link,
      is_read: false,
      created_at: Utc::now(),
    }
  }

  pub fn is_addressed_to(&self, actor: &Actor) -> bool {
    self.recipient_user_id == Some(actor.user_id) || self.recipient_role == Some(actor.role)
  }
}
