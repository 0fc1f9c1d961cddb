// marketplace/src/store/postgres.rs

use super::{Store, StoreTx};
use crate::errors::Result;
use crate::models::{
  Cart, CartItem, Notification, Order, OrderItem, OrderStatus, Product, Review, Role, Seller, User,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use tracing::{info, instrument};
use uuid::Uuid;

const SCHEMA: &str = include_str!("../../schema.sql");

const PRODUCT_COLUMNS: &str = "id, seller_id, name, description, price_cents, stock, approval_status, is_active, \
  discount_percent, discount_price_cents, discount_start, discount_end, average_rating, review_count, \
  created_at, updated_at";

const ORDER_COLUMNS: &str = "id, customer_id, seller_id, status, total_price_cents, shipping_method, \
  shipping_cost_cents, address, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  #[instrument(name = "PgStore::connect", skip_all, err)]
  pub async fn connect(database_url: &str) -> Result<Self> {
    let pool = PgPoolOptions::new().max_connections(10).connect(database_url).await?;
    info!("Successfully connected to the database.");
    Ok(Self::new(pool))
  }

  /// Creates missing types, tables and indexes.
  pub async fn migrate(&self) -> Result<()> {
    sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
    info!("Database schema is up to date.");
    Ok(())
  }
}

#[async_trait]
impl Store for PgStore {
  async fn begin(&self) -> Result<Box<dyn StoreTx>> {
    let tx = self.pool.begin().await?;
    Ok(Box::new(PgTx { tx }))
  }
}

struct PgTx {
  tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgTx {
  async fn get_user(&mut self, id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
      "SELECT id, username, email, role, is_staff, is_superuser, created_at FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&mut *self.tx)
    .await?;
    Ok(user)
  }

  async fn insert_user(&mut self, user: &User) -> Result<()> {
    sqlx::query(
      "INSERT INTO users (id, username, email, role, is_staff, is_superuser, created_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(user.id)
    .bind(&user.username)
    .bind(&user.email)
    .bind(user.role)
    .bind(user.is_staff)
    .bind(user.is_superuser)
    .bind(user.created_at)
    .execute(&mut *self.tx)
    .await?;
    Ok(())
  }

  async fn update_user_role(&mut self, id: Uuid, role: Role) -> Result<()> {
    sqlx::query("UPDATE users SET role = $1 WHERE id = $2")
      .bind(role)
      .bind(id)
      .execute(&mut *self.tx)
      .await?;
    Ok(())
  }

  async fn get_seller(&mut self, id: Uuid) -> Result<Option<Seller>> {
    let seller = sqlx::query_as::<_, Seller>(
      "SELECT id, user_id, shop_name, phone, address, created_at FROM sellers WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&mut *self.tx)
    .await?;
    Ok(seller)
  }

  async fn seller_for_user(&mut self, user_id: Uuid) -> Result<Option<Seller>> {
    let seller = sqlx::query_as::<_, Seller>(
      "SELECT id, user_id, shop_name, phone, address, created_at FROM sellers WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(&mut *self.tx)
    .await?;
    Ok(seller)
  }

  async fn insert_seller(&mut self, seller: &Seller) -> Result<()> {
    sqlx::query(
      "INSERT INTO sellers (id, user_id, shop_name, phone, address, created_at) VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(seller.id)
    .bind(seller.user_id)
    .bind(&seller.shop_name)
    .bind(&seller.phone)
    .bind(&seller.address)
    .bind(seller.created_at)
    .execute(&mut *self.tx)
    .await?;
    Ok(())
  }

  async fn get_product(&mut self, id: Uuid) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(&format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS))
      .bind(id)
      .fetch_optional(&mut *self.tx)
      .await?;
    Ok(product)
  }

  async fn insert_product(&mut self, p: &Product) -> Result<()> {
    sqlx::query(&format!(
      "INSERT INTO products ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
      PRODUCT_COLUMNS
    ))
    .bind(p.id)
    .bind(p.seller_id)
    .bind(&p.name)
    .bind(&p.description)
    .bind(p.price_cents)
    .bind(p.stock)
    .bind(p.approval_status)
    .bind(p.is_active)
    .bind(p.discount_percent)
    .bind(p.discount_price_cents)
    .bind(p.discount_start)
    .bind(p.discount_end)
    .bind(p.average_rating)
    .bind(p.review_count)
    .bind(p.created_at)
    .bind(p.updated_at)
    .execute(&mut *self.tx)
    .await?;
    Ok(())
  }

  async fn update_product(&mut self, p: &Product) -> Result<()> {
    sqlx::query(
      "UPDATE products SET name = $2, description = $3, price_cents = $4, stock = $5, approval_status = $6, \
       is_active = $7, discount_percent = $8, discount_price_cents = $9, discount_start = $10, discount_end = $11, \
       updated_at = $12 WHERE id = $1",
    )
    .bind(p.id)
    .bind(&p.name)
    .bind(&p.description)
    .bind(p.price_cents)
    .bind(p.stock)
    .bind(p.approval_status)
    .bind(p.is_active)
    .bind(p.discount_percent)
    .bind(p.discount_price_cents)
    .bind(p.discount_start)
    .bind(p.discount_end)
    .bind(p.updated_at)
    .execute(&mut *self.tx)
    .await?;
    Ok(())
  }

  async fn update_product_rating(&mut self, id: Uuid, average_rating: f64, review_count: i64) -> Result<()> {
    sqlx::query("UPDATE products SET average_rating = $1, review_count = $2 WHERE id = $3")
      .bind(average_rating)
      .bind(review_count)
      .bind(id)
      .execute(&mut *self.tx)
      .await?;
    Ok(())
  }

  async fn list_public_products(&mut self) -> Result<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(&format!(
      "SELECT {} FROM products WHERE is_active AND approval_status = 'approved' ORDER BY created_at, id",
      PRODUCT_COLUMNS
    ))
    .fetch_all(&mut *self.tx)
    .await?;
    Ok(products)
  }

  async fn products_by_seller(&mut self, seller_id: Uuid) -> Result<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(&format!(
      "SELECT {} FROM products WHERE seller_id = $1 ORDER BY created_at, id",
      PRODUCT_COLUMNS
    ))
    .bind(seller_id)
    .fetch_all(&mut *self.tx)
    .await?;
    Ok(products)
  }

  async fn decrement_stock(&mut self, product_id: Uuid, quantity: i64) -> Result<Option<i64>> {
    let remaining = sqlx::query_scalar::<_, i64>(
      "UPDATE products SET stock = stock - $1, updated_at = now() WHERE id = $2 AND stock >= $1 RETURNING stock",
    )
    .bind(quantity)
    .bind(product_id)
    .fetch_optional(&mut *self.tx)
    .await?;
    Ok(remaining)
  }

  async fn cart_for_user(&mut self, user_id: Uuid) -> Result<Option<Cart>> {
    let cart = sqlx::query_as::<_, Cart>("SELECT id, user_id, created_at FROM carts WHERE user_id = $1")
      .bind(user_id)
      .fetch_optional(&mut *self.tx)
      .await?;
    Ok(cart)
  }

  async fn insert_cart(&mut self, cart: &Cart) -> Result<()> {
    sqlx::query("INSERT INTO carts (id, user_id, created_at) VALUES ($1, $2, $3)")
      .bind(cart.id)
      .bind(cart.user_id)
      .bind(cart.created_at)
      .execute(&mut *self.tx)
      .await?;
    Ok(())
  }

  async fn cart_items(&mut self, cart_id: Uuid) -> Result<Vec<CartItem>> {
    let items = sqlx::query_as::<_, CartItem>(
      "SELECT id, cart_id, product_id, quantity, updated_at FROM cart_items WHERE cart_id = $1 ORDER BY updated_at, id",
    )
    .bind(cart_id)
    .fetch_all(&mut *self.tx)
    .await?;
    Ok(items)
  }

  async fn find_cart_item(&mut self, cart_id: Uuid, product_id: Uuid) -> Result<Option<CartItem>> {
    let item = sqlx::query_as::<_, CartItem>(
      "SELECT id, cart_id, product_id, quantity, updated_at FROM cart_items WHERE cart_id = $1 AND product_id = $2",
    )
    .bind(cart_id)
    .bind(product_id)
    .fetch_optional(&mut *self.tx)
    .await?;
    Ok(item)
  }

  async fn get_cart_item(&mut self, id: Uuid) -> Result<Option<CartItem>> {
    let item =
      sqlx::query_as::<_, CartItem>("SELECT id, cart_id, product_id, quantity, updated_at FROM cart_items WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
    Ok(item)
  }

  async fn insert_cart_item(&mut self, item: &CartItem) -> Result<()> {
    sqlx::query("INSERT INTO cart_items (id, cart_id, product_id, quantity, updated_at) VALUES ($1, $2, $3, $4, $5)")
      .bind(item.id)
      .bind(item.cart_id)
      .bind(item.product_id)
      .bind(item.quantity)
      .bind(item.updated_at)
      .execute(&mut *self.tx)
      .await?;
    Ok(())
  }

  async fn update_cart_item_quantity(&mut self, id: Uuid, quantity: i64, updated_at: DateTime<Utc>) -> Result<()> {
    sqlx::query("UPDATE cart_items SET quantity = $1, updated_at = $2 WHERE id = $3")
      .bind(quantity)
      .bind(updated_at)
      .bind(id)
      .execute(&mut *self.tx)
      .await?;
    Ok(())
  }

  async fn delete_cart_item(&mut self, id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM cart_items WHERE id = $1")
      .bind(id)
      .execute(&mut *self.tx)
      .await?;
    Ok(())
  }

  async fn clear_cart(&mut self, cart_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
      .bind(cart_id)
      .execute(&mut *self.tx)
      .await?;
    Ok(())
  }

  async fn insert_order(&mut self, o: &Order) -> Result<()> {
    sqlx::query(&format!(
      "INSERT INTO orders ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
      ORDER_COLUMNS
    ))
    .bind(o.id)
    .bind(o.customer_id)
    .bind(o.seller_id)
    .bind(o.status)
    .bind(o.total_price_cents)
    .bind(o.shipping_method)
    .bind(o.shipping_cost_cents)
    .bind(&o.address)
    .bind(o.created_at)
    .bind(o.updated_at)
    .execute(&mut *self.tx)
    .await?;
    Ok(())
  }

  async fn insert_order_item(&mut self, item: &OrderItem) -> Result<()> {
    sqlx::query(
      "INSERT INTO order_items (id, order_id, product_id, quantity, unit_price_cents) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(item.id)
    .bind(item.order_id)
    .bind(item.product_id)
    .bind(item.quantity)
    .bind(item.unit_price_cents)
    .execute(&mut *self.tx)
    .await?;
    Ok(())
  }

  async fn get_order(&mut self, id: Uuid) -> Result<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS))
      .bind(id)
      .fetch_optional(&mut *self.tx)
      .await?;
    Ok(order)
  }

  async fn lock_order(&mut self, id: Uuid) -> Result<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!("SELECT {} FROM orders WHERE id = $1 FOR UPDATE", ORDER_COLUMNS))
      .bind(id)
      .fetch_optional(&mut *self.tx)
      .await?;
    Ok(order)
  }

  async fn order_items(&mut self, order_id: Uuid) -> Result<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(
      "SELECT id, order_id, product_id, quantity, unit_price_cents FROM order_items WHERE order_id = $1 ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(&mut *self.tx)
    .await?;
    Ok(items)
  }

  async fn orders_for_customer(&mut self, customer_id: Uuid) -> Result<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
      "SELECT {} FROM orders WHERE customer_id = $1 ORDER BY created_at DESC, id DESC",
      ORDER_COLUMNS
    ))
    .bind(customer_id)
    .fetch_all(&mut *self.tx)
    .await?;
    Ok(orders)
  }

  async fn orders_for_seller(&mut self, seller_id: Uuid) -> Result<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
      "SELECT {} FROM orders WHERE seller_id = $1 ORDER BY created_at DESC, id DESC",
      ORDER_COLUMNS
    ))
    .bind(seller_id)
    .fetch_all(&mut *self.tx)
    .await?;
    Ok(orders)
  }

  async fn update_order_status(&mut self, id: Uuid, status: OrderStatus, updated_at: DateTime<Utc>) -> Result<()> {
    sqlx::query("UPDATE orders SET status = $1, updated_at = $2 WHERE id = $3")
      .bind(status)
      .bind(updated_at)
      .bind(id)
      .execute(&mut *self.tx)
      .await?;
    Ok(())
  }

  async fn insert_notification(&mut self, n: &Notification) -> Result<()> {
    sqlx::query(
      "INSERT INTO notifications (id, recipient_user_id, recipient_role, title, message, link, is_read, created_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(n.id)
    .bind(n.recipient_user_id)
    .bind(n.recipient_role)
    .bind(&n.title)
    .bind(&n.message)
    .bind(&n.link)
    .bind(n.is_read)
    .bind(n.created_at)
    .execute(&mut *self.tx)
    .await?;
    Ok(())
  }

  async fn notifications_for(&mut self, user_id: Uuid, role: Role) -> Result<Vec<Notification>> {
    let rows = sqlx::query_as::<_, Notification>(
      "SELECT id, recipient_user_id, recipient_role, title, message, link, is_read, created_at FROM notifications \
       WHERE recipient_user_id = $1 OR recipient_role = $2 ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .bind(role)
    .fetch_all(&mut *self.tx)
    .await?;
    Ok(rows)
  }

  async fn get_notification(&mut self, id: Uuid) -> Result<Option<Notification>> {
    let row = sqlx::query_as::<_, Notification>(
      "SELECT id, recipient_user_id, recipient_role, title, message, link, is_read, created_at FROM notifications \
       WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&mut *self.tx)
    .await?;
    Ok(row)
  }

  async fn mark_notification_read(&mut self, id: Uuid) -> Result<()> {
    sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1")
      .bind(id)
      .execute(&mut *self.tx)
      .await?;
    Ok(())
  }

  async fn insert_review(&mut self, r: &Review) -> Result<()> {
    sqlx::query(
      "INSERT INTO reviews (id, product_id, user_id, rating, comment, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(r.id)
    .bind(r.product_id)
    .bind(r.user_id)
    .bind(r.rating)
    .bind(&r.comment)
    .bind(r.created_at)
    .bind(r.updated_at)
    .execute(&mut *self.tx)
    .await?;
    Ok(())
  }

  async fn update_review(&mut self, r: &Review) -> Result<()> {
    sqlx::query("UPDATE reviews SET rating = $1, comment = $2, updated_at = $3 WHERE id = $4")
      .bind(r.rating)
      .bind(&r.comment)
      .bind(r.updated_at)
      .bind(r.id)
      .execute(&mut *self.tx)
      .await?;
    Ok(())
  }

  async fn delete_review(&mut self, id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM reviews WHERE id = $1")
      .bind(id)
      .execute(&mut *self.tx)
      .await?;
    Ok(())
  }

  async fn get_review(&mut self, id: Uuid) -> Result<Option<Review>> {
    let row = sqlx::query_as::<_, Review>(
      "SELECT id, product_id, user_id, rating, comment, created_at, updated_at FROM reviews WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&mut *self.tx)
    .await?;
    Ok(row)
  }

  async fn review_by(&mut self, product_id: Uuid, user_id: Uuid) -> Result<Option<Review>> {
    let row = sqlx::query_as::<_, Review>(
      "SELECT id, product_id, user_id, rating, comment, created_at, updated_at FROM reviews \
       WHERE product_id = $1 AND user_id = $2",
    )
    .bind(product_id)
    .bind(user_id)
    .fetch_optional(&mut *self.tx)
    .await?;
    Ok(row)
  }

  async fn reviews_for_product(&mut self, product_id: Uuid) -> Result<Vec<Review>> {
    let rows = sqlx::query_as::<_, Review>(
      "SELECT id, product_id, user_id, rating, comment, created_at, updated_at FROM reviews \
       WHERE product_id = $1 ORDER BY created_at DESC, id DESC",
    )
    .bind(product_id)
    .fetch_all(&mut *self.tx)
    .await?;
    Ok(rows)
  }

  async fn commit(self: Box<Self>) -> Result<()> {
    self.tx.commit().await?;
    Ok(())
  }
}
