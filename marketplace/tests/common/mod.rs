// marketplace/tests/common/mod.rs
#![allow(dead_code)]

use chrono::Utc;
use marketplace::config::{AppConfig, ShippingRates};
use marketplace::models::{Actor, ApprovalStatus, Notification, Product, Role};
use marketplace::services::accounts::{self, NewUser, SellerRegistration};
use marketplace::state::AppState;
use marketplace::store::{MemoryStore, Store};
use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::Level;
use uuid::Uuid;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  let _ = tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub const SHIPPING_CENTS: i64 = 15;
pub const LOW_STOCK_THRESHOLD: i64 = 20;

/// A marketplace with an admin, a customer and two sellers.
pub struct World {
  pub state: AppState,
  pub admin: Actor,
  pub customer: Actor,
  pub seller_a: Actor,
  pub seller_b: Actor,
}

impl World {
  pub fn store(&self) -> &dyn Store {
    self.state.store.as_ref()
  }

  pub fn seller_id(actor: &Actor) -> Uuid {
    actor.seller_id.expect("actor has a seller profile")
  }

  /// Approved, active product at list price.
  pub async fn product(&self, seller: &Actor, name: &str, price_cents: i64, stock: i64) -> Product {
    let now = Utc::now();
    let product = Product {
      id: Uuid::new_v4(),
      seller_id: Self::seller_id(seller),
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
    };
    let mut tx = self.store().begin().await.unwrap();
    tx.insert_product(&product).await.unwrap();
    tx.commit().await.unwrap();
    product
  }

  pub async fn stock_of(&self, product_id: Uuid) -> i64 {
    let mut tx = self.store().begin().await.unwrap();
    tx.get_product(product_id).await.unwrap().expect("product exists").stock
  }

  pub async fn notifications_of(&self, actor: &Actor) -> Vec<Notification> {
    let mut tx = self.store().begin().await.unwrap();
    tx.notifications_for(actor.user_id, actor.role).await.unwrap()
  }

  pub async fn user(&self, username: &str) -> Actor {
    create_actor(self.store(), NewUser::customer(username)).await
  }
}

async fn create_actor(store: &dyn Store, new_user: NewUser) -> Actor {
  let mut tx = store.begin().await.unwrap();
  let user = accounts::create_user(tx.as_mut(), new_user).await.unwrap();
  let actor = accounts::resolve_actor(tx.as_mut(), user.id).await.unwrap();
  tx.commit().await.unwrap();
  actor
}

async fn create_seller(store: &dyn Store, username: &str) -> Actor {
  let user = create_actor(store, NewUser::customer(username)).await;
  accounts::register_seller(
    store,
    user.user_id,
    SellerRegistration {
      shop_name: format!("{} shop", username),
      phone: String::new(),
      address: String::new(),
    },
  )
  .await
  .unwrap();
  accounts::load_actor(store, user.user_id).await.unwrap()
}

pub fn test_config() -> AppConfig {
  AppConfig {
    low_stock_threshold: LOW_STOCK_THRESHOLD,
    shipping_rates: ShippingRates {
      standard_cents: SHIPPING_CENTS,
      express_cents: 30,
      pickup_cents: 0,
    },
    ..AppConfig::default()
  }
}

pub async fn world() -> World {
  setup_tracing();
  let state = AppState::new(Arc::new(MemoryStore::new()), test_config());
  let store = state.store.as_ref();

  let admin = create_actor(
    store,
    NewUser {
      username: "admin".into(),
      email: "admin@example.com".into(),
      role: Role::Customer,
      is_staff: true,
      is_superuser: false,
    },
  )
  .await;
  let customer = create_actor(store, NewUser::customer("carol")).await;
  let seller_a = create_seller(store, "sam").await;
  let seller_b = create_seller(store, "sue").await;

  World {
    state,
    admin,
    customer,
    seller_a,
    seller_b,
  }
}
