// marketplace/src/services/accounts.rs

use crate::errors::{AppError, Result as AppResult};
use crate::models::{Actor, Role, Seller, User};
use crate::store::{Store, StoreTx};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

/// Resolves the acting user inside an open transaction.
pub async fn resolve_actor(tx: &mut dyn StoreTx, user_id: Uuid) -> AppResult<Actor> {
  let user = tx
    .get_user(user_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User with ID {} not found.", user_id)))?;
  let seller = tx.seller_for_user(user_id).await?;
  Ok(Actor::resolve(&user, seller.as_ref()))
}

/// Resolves the acting user with a short read-only transaction.
pub async fn load_actor(store: &dyn Store, user_id: Uuid) -> AppResult<Actor> {
  let mut tx = store.begin().await?;
  resolve_actor(tx.as_mut(), user_id).await
}

#[derive(Debug, Clone)]
pub struct NewUser {
  pub username: String,
  pub email: String,
  pub role: Role,
  pub is_staff: bool,
  pub is_superuser: bool,
}

impl NewUser {
  pub fn customer(username: &str) -> Self {
    Self {
      username: username.to_string(),
      email: format!("{}@example.com", username),
      role: Role::Customer,
      is_staff: false,
      is_superuser: false,
    }
  }
}

/// Inserts a user record. Registration itself lives with the identity
/// provider; this is what seeding and tests go through.
pub async fn create_user(tx: &mut dyn StoreTx, new_user: NewUser) -> AppResult<User> {
  if new_user.username.trim().is_empty() {
    return Err(AppError::Validation("Username must not be empty.".to_string()));
  }
  let user = User {
    id: Uuid::new_v4(),
    username: new_user.username,
    email: new_user.email,
    role: new_user.role,
    is_staff: new_user.is_staff,
    is_superuser: new_user.is_superuser,
    created_at: Utc::now(),
  };
  tx.insert_user(&user).await?;
  Ok(user)
}

#[derive(Debug, Clone, Deserialize)]
pub struct SellerRegistration {
  pub shop_name: String,
  #[serde(default)]
  pub phone: String,
  #[serde(default)]
  pub address: String,
}

pub async fn attach_seller_profile(
  tx: &mut dyn StoreTx,
  user_id: Uuid,
  registration: SellerRegistration,
) -> AppResult<Seller> {
  let shop_name = registration.shop_name.trim().to_string();
  if shop_name.is_empty() {
    return Err(AppError::Validation("Shop name must not be empty.".to_string()));
  }
  if tx.get_user(user_id).await?.is_none() {
    return Err(AppError::NotFound(format!("User with ID {} not found.", user_id)));
  }
  if tx.seller_for_user(user_id).await?.is_some() {
    return Err(AppError::Validation("User already has a seller profile.".to_string()));
  }

  let seller = Seller {
    id: Uuid::new_v4(),
    user_id,
    shop_name,
    phone: registration.phone,
    address: registration.address,
    created_at: Utc::now(),
  };
  tx.insert_seller(&seller).await?;
  tx.update_user_role(user_id, Role::Seller).await?;
  Ok(seller)
}

/// Gives `user_id` a shop and the seller role.
#[instrument(name = "accounts::register_seller", skip(store, registration), fields(%user_id), err)]
pub async fn register_seller(
  store: &dyn Store,
  user_id: Uuid,
  registration: SellerRegistration,
) -> AppResult<Seller> {
  let mut tx = store.begin().await?;
  let seller = attach_seller_profile(tx.as_mut(), user_id, registration).await?;
  tx.commit().await?;
  info!(seller_id = %seller.id, "Seller profile registered.");
  Ok(seller)
}
