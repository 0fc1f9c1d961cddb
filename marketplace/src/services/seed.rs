// marketplace/src/services/seed.rs

//! Demo data for local runs: an admin, a seller with a few approved
//! products and a customer, with fixed ids so requests can be scripted.

use crate::errors::Result as AppResult;
use crate::models::{ApprovalStatus, Product, Role, Seller, User};
use crate::store::Store;
use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

pub const ADMIN_USER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0001);
pub const SELLER_USER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0002);
pub const CUSTOMER_USER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0003);
pub const SELLER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0102);

fn user(id: Uuid, username: &str, role: Role, is_staff: bool) -> User {
  User {
    id,
    username: username.to_string(),
    email: format!("{}@example.com", username),
    role,
    is_staff,
    is_superuser: false,
    created_at: Utc::now(),
  }
}

/// Inserts the demo records unless they are already there.
#[instrument(name = "seed::seed_demo_data", skip_all, err)]
pub async fn seed_demo_data(store: &dyn Store) -> AppResult<()> {
  let mut tx = store.begin().await?;
  if tx.get_user(ADMIN_USER_ID).await?.is_some() {
    info!("Demo data already present, skipping seed.");
    return Ok(());
  }

  tx.insert_user(&user(ADMIN_USER_ID, "admin", Role::Admin, true)).await?;
  tx.insert_user(&user(SELLER_USER_ID, "demo_seller", Role::Seller, false)).await?;
  tx.insert_user(&user(CUSTOMER_USER_ID, "demo_customer", Role::Customer, false)).await?;
  tx.insert_seller(&Seller {
    id: SELLER_ID,
    user_id: SELLER_USER_ID,
    shop_name: "Demo Goods".to_string(),
    phone: "+000000000".to_string(),
    address: "1 Market Street".to_string(),
    created_at: Utc::now(),
  })
  .await?;

  for (name, price_cents, stock) in [("Desk Lamp", 45_000, 30), ("Notebook", 8_000, 120), ("Mug", 12_000, 25)] {
    let now = Utc::now();
    tx.insert_product(&Product {
      id: Uuid::new_v4(),
      seller_id: SELLER_ID,
      name: name.to_string(),
      description: String::new(),
      price_cents,
      stock,
      approval_status: ApprovalStatus::Approved,
      is_active: true,
      discount_percent: None,
      discount_price_cents: None,
      discount_start: None,
      discount_end: None,
      average_rating: 0.0,
      review_count: 0,
      created_at: now,
      updated_at: now,
    })
    .await?;
  }
  tx.commit().await?;

  info!(admin = %ADMIN_USER_ID, seller = %SELLER_USER_ID, customer = %CUSTOMER_USER_ID, "Demo data seeded.");
  Ok(())
}
