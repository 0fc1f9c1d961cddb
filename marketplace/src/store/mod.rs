// marketplace/src/store/mod.rs

//! Persistence behind two object-safe traits.
//!
//! Every operation that mutates state opens one [`StoreTx`], does all of its
//! reads and writes through it and calls [`StoreTx::commit`]. A transaction
//! dropped without commit is rolled back, so returning early with `?` leaves
//! storage untouched. Transactions must not be nested.

pub mod memory;
pub mod postgres;

use crate::errors::Result;
use crate::models::{
  Cart, CartItem, Notification, Order, OrderItem, OrderStatus, Product, Review, Role, Seller, User,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
  async fn begin(&self) -> Result<Box<dyn StoreTx>>;
}

#[async_trait]
pub trait StoreTx: Send {
  // --- accounts ---
  async fn get_user(&mut self, id: Uuid) -> Result<Option<User>>;
  async fn insert_user(&mut self, user: &User) -> Result<()>;
  async fn update_user_role(&mut self, id: Uuid, role: Role) -> Result<()>;
  async fn get_seller(&mut self, id: Uuid) -> Result<Option<Seller>>;
  async fn seller_for_user(&mut self, user_id: Uuid) -> Result<Option<Seller>>;
  async fn insert_seller(&mut self, seller: &Seller) -> Result<()>;

  // --- catalog ---
  async fn get_product(&mut self, id: Uuid) -> Result<Option<Product>>;
  async fn insert_product(&mut self, product: &Product) -> Result<()>;
  async fn update_product(&mut self, product: &Product) -> Result<()>;
  async fn update_product_rating(&mut self, id: Uuid, average_rating: f64, review_count: i64) -> Result<()>;
  /// Approved and active products, oldest first.
  async fn list_public_products(&mut self) -> Result<Vec<Product>>;
  async fn products_by_seller(&mut self, seller_id: Uuid) -> Result<Vec<Product>>;
  /// Takes `quantity` off the product's stock only if at least that much is
  /// left. Returns the new stock, or `None` when nothing was changed.
  async fn decrement_stock(&mut self, product_id: Uuid, quantity: i64) -> Result<Option<i64>>;

  // --- cart ---
  async fn cart_for_user(&mut self, user_id: Uuid) -> Result<Option<Cart>>;
  async fn insert_cart(&mut self, cart: &Cart) -> Result<()>;
  async fn cart_items(&mut self, cart_id: Uuid) -> Result<Vec<CartItem>>;
  async fn find_cart_item(&mut self, cart_id: Uuid, product_id: Uuid) -> Result<Option<CartItem>>;
  async fn get_cart_item(&mut self, id: Uuid) -> Result<Option<CartItem>>;
  async fn insert_cart_item(&mut self, item: &CartItem) -> Result<()>;
  async fn update_cart_item_quantity(&mut self, id: Uuid, quantity: i64, updated_at: DateTime<Utc>) -> Result<()>;
  async fn delete_cart_item(&mut self, id: Uuid) -> Result<()>;
  async fn clear_cart(&mut self, cart_id: Uuid) -> Result<()>;

  // --- orders ---
  async fn insert_order(&mut self, order: &Order) -> Result<()>;
  async fn insert_order_item(&mut self, item: &OrderItem) -> Result<()>;
  async fn get_order(&mut self, id: Uuid) -> Result<Option<Order>>;
  /// Like `get_order`, but holds the row until the transaction ends.
  async fn lock_order(&mut self, id: Uuid) -> Result<Option<Order>>;
  async fn order_items(&mut self, order_id: Uuid) -> Result<Vec<OrderItem>>;
  /// Newest first.
  async fn orders_for_customer(&mut self, customer_id: Uuid) -> Result<Vec<Order>>;
  /// Newest first.
  async fn orders_for_seller(&mut self, seller_id: Uuid) -> Result<Vec<Order>>;
  async fn update_order_status(&mut self, id: Uuid, status: OrderStatus, updated_at: DateTime<Utc>) -> Result<()>;

  // --- notifications ---
  async fn insert_notification(&mut self, notification: &Notification) -> Result<()>;
  /// Addressed to `user_id` directly or to `role`, newest first.
  async fn notifications_for(&mut self, user_id: Uuid, role: Role) -> Result<Vec<Notification>>;
  async fn get_notification(&mut self, id: Uuid) -> Result<Option<Notification>>;
  async fn mark_notification_read(&mut self, id: Uuid) -> Result<()>;

  // --- reviews ---
  async fn insert_review(&mut self, review: &Review) -> Result<()>;
  async fn update_review(&mut self, review: &Review) -> Result<()>;
  async fn delete_review(&mut self, id: Uuid) -> Result<()>;
  async fn get_review(&mut self, id: Uuid) -> Result<Option<Review>>;
  async fn review_by(&mut self, product_id: Uuid, user_id: Uuid) -> Result<Option<Review>>;
  /// Newest first.
  async fn reviews_for_product(&mut self, product_id: Uuid) -> Result<Vec<Review>>;

  async fn commit(self: Box<Self>) -> Result<()>;
}
