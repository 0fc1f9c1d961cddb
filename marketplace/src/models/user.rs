// marketplace/src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Customer,
  Seller,
  Admin,
}

impl std::fmt::Display for Role {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(match self {
      Role::Customer => "customer",
      Role::Seller => "seller",
      Role::Admin => "admin",
    })
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
  pub id: Uuid,
  pub username: String,
  pub email: String,
  pub role: Role,
  pub is_staff: bool,
  pub is_superuser: bool,
  pub created_at: DateTime<Utc>,
}

impl User {
  /// Staff and superusers act as admins whatever their profile says.
  pub fn resolved_role(&self) -> Role {
    if self.is_staff || self.is_superuser {
      Role::Admin
    } else {
      self.role
    }
  }
}

/// Shop profile of a user who sells on the marketplace.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Seller {
  pub id: Uuid,
  pub user_id: Uuid,
  pub shop_name: String,
  pub phone: String,
  pub address: String,
  pub created_at: DateTime<Utc>,
}

/// The user behind a request, resolved once and handed to every
/// permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Actor {
  pub user_id: Uuid,
  pub role: Role,
  pub seller_id: Option<Uuid>,
}

impl Actor {
  pub fn resolve(user: &User, seller: Option<&Seller>) -> Self {
    Self {
      user_id: user.id,
      role: user.resolved_role(),
      seller_id: seller.map(|s| s.id),
    }
  }

  pub fn is_admin(&self) -> bool {
    self.role == Role::Admin
  }

  pub fn is_seller(&self, seller_id: Uuid) -> bool {
    self.seller_id == Some(seller_id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn user(role: Role, is_staff: bool, is_superuser: bool) -> User {
    User {
      id: Uuid::new_v4(),
      username: "u".into(),
      email: "u@example.com".into(),
      role,
      is_staff,
      is_superuser,
      created_at: Utc::now(),
    }
  }

  #[test]
  fn staff_and_superusers_resolve_to_admin() {
    assert_eq!(user(Role::Customer, true, false).resolved_role(), Role::Admin);
    assert_eq!(user(Role::Seller, false, true).resolved_role(), Role::Admin);
    assert_eq!(user(Role::Seller, false, false).resolved_role(), Role::Seller);
    assert_eq!(user(Role::Customer, false, false).resolved_role(), Role::Customer);
  }
}
