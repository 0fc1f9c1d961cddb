// marketplace/src/store/memory.rs

//! In-process store used by tests and by servers started without a database.
//!
//! A transaction takes the single table lock and edits a private copy of the
//! tables; commit swaps the copy in. Transactions are therefore serialised
//! and a dropped transaction leaves no trace.

use super::{Store, StoreTx};
use crate::errors::Result;
use crate::models::{
  ApprovalStatus, Cart, CartItem, Notification, Order, OrderItem, OrderStatus, Product, Review, Role, Seller, User,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

// Rows are kept in insertion order, which doubles as creation order.
#[derive(Debug, Clone, Default)]
struct Tables {
  users: Vec<User>,
  sellers: Vec<Seller>,
  products: Vec<Product>,
  carts: Vec<Cart>,
  cart_items: Vec<CartItem>,
  orders: Vec<Order>,
  order_items: Vec<OrderItem>,
  notifications: Vec<Notification>,
  reviews: Vec<Review>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
  tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl Store for MemoryStore {
  async fn begin(&self) -> Result<Box<dyn StoreTx>> {
    let guard = self.tables.clone().lock_owned().await;
    let working = guard.clone();
    Ok(Box::new(MemoryTx { guard, working }))
  }
}

struct MemoryTx {
  guard: OwnedMutexGuard<Tables>,
  working: Tables,
}

fn find<T: Clone>(rows: &[T], pred: impl Fn(&T) -> bool) -> Option<T> {
  rows.iter().find(|r| pred(r)).cloned()
}

fn newest_first<T: Clone>(rows: &[T], pred: impl Fn(&T) -> bool) -> Vec<T> {
  rows.iter().rev().filter(|r| pred(r)).cloned().collect()
}

#[async_trait]
impl StoreTx for MemoryTx {
  async fn get_user(&mut self, id: Uuid) -> Result<Option<User>> {
    Ok(find(&self.working.users, |u| u.id == id))
  }

  async fn insert_user(&mut self, user: &User) -> Result<()> {
    self.working.users.push(user.clone());
    Ok(())
  }

  async fn update_user_role(&mut self, id: Uuid, role: Role) -> Result<()> {
    if let Some(user) = self.working.users.iter_mut().find(|u| u.id == id) {
      user.role = role;
    }
    Ok(())
  }

  async fn get_seller(&mut self, id: Uuid) -> Result<Option<Seller>> {
    Ok(find(&self.working.sellers, |s| s.id == id))
  }

  async fn seller_for_user(&mut self, user_id: Uuid) -> Result<Option<Seller>> {
    Ok(find(&self.working.sellers, |s| s.user_id == user_id))
  }

  async fn insert_seller(&mut self, seller: &Seller) -> Result<()> {
    self.working.sellers.push(seller.clone());
    Ok(())
  }

  async fn get_product(&mut self, id: Uuid) -> Result<Option<Product>> {
    Ok(find(&self.working.products, |p| p.id == id))
  }

  async fn insert_product(&mut self, product: &Product) -> Result<()> {
    self.working.products.push(product.clone());
    Ok(())
  }

  async fn update_product(&mut self, product: &Product) -> Result<()> {
    if let Some(row) = self.working.products.iter_mut().find(|p| p.id == product.id) {
      *row = product.clone();
    }
    Ok(())
  }

  async fn update_product_rating(&mut self, id: Uuid, average_rating: f64, review_count: i64) -> Result<()> {
    if let Some(row) = self.working.products.iter_mut().find(|p| p.id == id) {
      row.average_rating = average_rating;
      row.review_count = review_count;
    }
    Ok(())
  }

  async fn list_public_products(&mut self) -> Result<Vec<Product>> {
    Ok(
      self
        .working
        .products
        .iter()
        .filter(|p| p.is_active && p.approval_status == ApprovalStatus::Approved)
        .cloned()
        .collect(),
    )
  }

  async fn products_by_seller(&mut self, seller_id: Uuid) -> Result<Vec<Product>> {
    Ok(self.working.products.iter().filter(|p| p.seller_id == seller_id).cloned().collect())
  }

  async fn decrement_stock(&mut self, product_id: Uuid, quantity: i64) -> Result<Option<i64>> {
    match self.working.products.iter_mut().find(|p| p.id == product_id) {
      Some(product) if product.stock >= quantity => {
        product.stock -= quantity;
        product.updated_at = Utc::now();
        Ok(Some(product.stock))
      }
      _ => Ok(None),
    }
  }

  async fn cart_for_user(&mut self, user_id: Uuid) -> Result<Option<Cart>> {
    Ok(find(&self.working.carts, |c| c.user_id == user_id))
  }

  async fn insert_cart(&mut self, cart: &Cart) -> Result<()> {
    self.working.carts.push(cart.clone());
    Ok(())
  }

  async fn cart_items(&mut self, cart_id: Uuid) -> Result<Vec<CartItem>> {
    Ok(self.working.cart_items.iter().filter(|i| i.cart_id == cart_id).cloned().collect())
  }

  async fn find_cart_item(&mut self, cart_id: Uuid, product_id: Uuid) -> Result<Option<CartItem>> {
    Ok(find(&self.working.cart_items, |i| {
      i.cart_id == cart_id && i.product_id == product_id
    }))
  }

  async fn get_cart_item(&mut self, id: Uuid) -> Result<Option<CartItem>> {
    Ok(find(&self.working.cart_items, |i| i.id == id))
  }

  async fn insert_cart_item(&mut self, item: &CartItem) -> Result<()> {
    self.working.cart_items.push(item.clone());
    Ok(())
  }

  async fn update_cart_item_quantity(&mut self, id: Uuid, quantity: i64, updated_at: DateTime<Utc>) -> Result<()> {
    if let Some(item) = self.working.cart_items.iter_mut().find(|i| i.id == id) {
      item.quantity = quantity;
      item.updated_at = updated_at;
    }
    Ok(())
  }

  async fn delete_cart_item(&mut self, id: Uuid) -> Result<()> {
    self.working.cart_items.retain(|i| i.id != id);
    Ok(())
  }

  async fn clear_cart(&mut self, cart_id: Uuid) -> Result<()> {
    self.working.cart_items.retain(|i| i.cart_id != cart_id);
    Ok(())
  }

  async fn insert_order(&mut self, order: &Order) -> Result<()> {
    self.working.orders.push(order.clone());
    Ok(())
  }

  async fn insert_order_item(&mut self, item: &OrderItem) -> Result<()> {
    self.working.order_items.push(item.clone());
    Ok(())
  }

  async fn get_order(&mut self, id: Uuid) -> Result<Option<Order>> {
    Ok(find(&self.working.orders, |o| o.id == id))
  }

  async fn lock_order(&mut self, id: Uuid) -> Result<Option<Order>> {
    // The whole store is already held by this transaction.
    self.get_order(id).await
  }

  async fn order_items(&mut self, order_id: Uuid) -> Result<Vec<OrderItem>> {
    Ok(self.working.order_items.iter().filter(|i| i.order_id == order_id).cloned().collect())
  }

  async fn orders_for_customer(&mut self, customer_id: Uuid) -> Result<Vec<Order>> {
    Ok(newest_first(&self.working.orders, |o| o.customer_id == customer_id))
  }

  async fn orders_for_seller(&mut self, seller_id: Uuid) -> Result<Vec<Order>> {
    Ok(newest_first(&self.working.orders, |o| o.seller_id == seller_id))
  }

  async fn update_order_status(&mut self, id: Uuid, status: OrderStatus, updated_at: DateTime<Utc>) -> Result<()> {
    if let Some(order) = self.working.orders.iter_mut().find(|o| o.id == id) {
      order.status = status;
      order.updated_at = updated_at;
    }
    Ok(())
  }

  async fn insert_notification(&mut self, notification: &Notification) -> Result<()> {
    self.working.notifications.push(notification.clone());
    Ok(())
  }

  async fn notifications_for(&mut self, user_id: Uuid, role: Role) -> Result<Vec<Notification>> {
    Ok(newest_first(&self.working.notifications, |n| {
      n.recipient_user_id == Some(user_id) || n.recipient_role == Some(role)
    }))
  }

  async fn get_notification(&mut self, id: Uuid) -> Result<Option<Notification>> {
    Ok(find(&self.working.notifications, |n| n.id == id))
  }

  async fn mark_notification_read(&mut self, id: Uuid) -> Result<()> {
    if let Some(n) = self.working.notifications.iter_mut().find(|n| n.id == id) {
      n.is_read = true;
    }
    Ok(())
  }

  async fn insert_review(&mut self, review: &Review) -> Result<()> {
    self.working.reviews.push(review.clone());
    Ok(())
  }

  async fn update_review(&mut self, review: &Review) -> Result<()> {
    if let Some(row) = self.working.reviews.iter_mut().find(|r| r.id == review.id) {
      *row = review.clone();
    }
    Ok(())
  }

  async fn delete_review(&mut self, id: Uuid) -> Result<()> {
    self.working.reviews.retain(|r| r.id != id);
    Ok(())
  }

  async fn get_review(&mut self, id: Uuid) -> Result<Option<Review>> {
    Ok(find(&self.working.reviews, |r| r.id == id))
  }

  async fn review_by(&mut self, product_id: Uuid, user_id: Uuid) -> Result<Option<Review>> {
    Ok(find(&self.working.reviews, |r| {
      r.product_id == product_id && r.user_id == user_id
    }))
  }

  async fn reviews_for_product(&mut self, product_id: Uuid) -> Result<Vec<Review>> {
    Ok(newest_first(&self.working.reviews, |r| r.product_id == product_id))
  }

  async fn commit(self: Box<Self>) -> Result<()> {
    let MemoryTx { mut guard, working } = *self;
    *guard = working;
    Ok(())
  }
}
