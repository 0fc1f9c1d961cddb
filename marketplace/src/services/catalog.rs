// marketplace/src/services/catalog.rs

use crate::errors::{AppError, Result as AppResult};
use crate::models::{Actor, ApprovalStatus, Product, Recipient, Role};
use crate::services::notifications;
use crate::store::Store;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductDraft {
  pub name: String,
  #[serde(default)]
  pub description: String,
  pub price_cents: i64,
  pub stock: i64,
  #[serde(default)]
  pub is_active: Option<bool>,
  #[serde(default)]
  pub discount_percent: Option<i32>,
  #[serde(default)]
  pub discount_price_cents: Option<i64>,
  #[serde(default)]
  pub discount_start: Option<DateTime<Utc>>,
  #[serde(default)]
  pub discount_end: Option<DateTime<Utc>>,
}

/// Partial edit. Discount fields replace the whole discount window when any
/// of them is given; `clear_discount` drops it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
  pub name: Option<String>,
  pub description: Option<String>,
  pub price_cents: Option<i64>,
  pub stock: Option<i64>,
  pub is_active: Option<bool>,
  pub discount_percent: Option<i32>,
  pub discount_price_cents: Option<i64>,
  pub discount_start: Option<DateTime<Utc>>,
  pub discount_end: Option<DateTime<Utc>>,
  #[serde(default)]
  pub clear_discount: bool,
}

impl ProductPatch {
  fn touches_discount(&self) -> bool {
    self.discount_percent.is_some()
      || self.discount_price_cents.is_some()
      || self.discount_start.is_some()
      || self.discount_end.is_some()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalDecision {
  Approve,
  Reject,
}

fn has_discount(p: &Product) -> bool {
  p.discount_percent.is_some() || p.discount_price_cents.is_some() || p.discount_start.is_some() || p.discount_end.is_some()
}

fn validate(p: &Product) -> AppResult<()> {
  if p.name.trim().is_empty() {
    return Err(AppError::Validation("Product name must not be empty.".to_string()));
  }
  if p.price_cents < 0 {
    return Err(AppError::Validation("Price must not be negative.".to_string()));
  }
  if p.stock < 0 {
    return Err(AppError::Validation("Stock must not be negative.".to_string()));
  }
  if has_discount(p) && !p.discount_is_valid() {
    return Err(AppError::Validation(
      "Discount needs a start and end date and either a percent between 1 and 100 or a price below the list price."
        .to_string(),
    ));
  }
  Ok(())
}

#[instrument(name = "catalog::create_product", skip(store, draft), fields(actor = %actor.user_id), err)]
pub async fn create_product(store: &dyn Store, actor: &Actor, draft: ProductDraft) -> AppResult<Product> {
  let seller_id = actor
    .seller_id
    .ok_or_else(|| AppError::Permission("Only sellers can create products.".to_string()))?;

  let now = Utc::now();
  let product = Product {
    id: Uuid::new_v4(),
    seller_id,
    name: draft.name.trim().to_string(),
    description: draft.description,
    price_cents: draft.price_cents,
    stock: draft.stock,
    approval_status: ApprovalStatus::Pending,
    is_active: draft.is_active.unwrap_or(true),
    discount_percent: draft.discount_percent,
    discount_price_cents: draft.discount_price_cents,
    discount_start: draft.discount_start,
    discount_end: draft.discount_end,
    average_rating: 0.0,
    review_count: 0,
    created_at: now,
    updated_at: now,
  };
  validate(&product)?;

  let mut tx = store.begin().await?;
  tx.insert_product(&product).await?;
  notifications::create(
    tx.as_mut(),
    Recipient::Role(Role::Admin),
    "Product awaiting approval",
    format!("'{}' was submitted and needs review.", product.name),
    Some(format!("/products/{}", product.id)),
  )
  .await?;
  tx.commit().await?;
  info!(product_id = %product.id, "Product created, pending approval.");
  Ok(product)
}

/// Owner-only edit. Any change sends the product back to review.
#[instrument(name = "catalog::update_product", skip(store, patch), fields(actor = %actor.user_id), err)]
pub async fn update_product(
  store: &dyn Store,
  actor: &Actor,
  product_id: Uuid,
  patch: ProductPatch,
) -> AppResult<Product> {
  let mut tx = store.begin().await?;
  let mut product = tx
    .get_product(product_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Product with ID {} not found.", product_id)))?;
  if !actor.is_seller(product.seller_id) {
    return Err(AppError::Permission("Only the owning seller can edit this product.".to_string()));
  }

  if let Some(name) = &patch.name {
    product.name = name.trim().to_string();
  }
  if let Some(description) = &patch.description {
    product.description = description.clone();
  }
  if let Some(price) = patch.price_cents {
    product.price_cents = price;
  }
  if let Some(stock) = patch.stock {
    product.stock = stock;
  }
  if let Some(active) = patch.is_active {
    product.is_active = active;
  }
  if patch.clear_discount {
    product.discount_percent = None;
    product.discount_price_cents = None;
    product.discount_start = None;
    product.discount_end = None;
  } else if patch.touches_discount() {
    product.discount_percent = patch.discount_percent;
    product.discount_price_cents = patch.discount_price_cents;
    product.discount_start = patch.discount_start;
    product.discount_end = patch.discount_end;
  }
  product.approval_status = ApprovalStatus::Pending;
  product.updated_at = Utc::now();
  validate(&product)?;

  tx.update_product(&product).await?;
  tx.commit().await?;
  info!(product_id = %product.id, "Product updated, approval reset to pending.");
  Ok(product)
}

#[instrument(name = "catalog::review_product", skip(store), fields(actor = %actor.user_id), err)]
pub async fn review_product(
  store: &dyn Store,
  actor: &Actor,
  product_id: Uuid,
  decision: ApprovalDecision,
) -> AppResult<Product> {
  if !actor.is_admin() {
    return Err(AppError::Permission("Only admins can approve or reject products.".to_string()));
  }
  let mut tx = store.begin().await?;
  let mut product = tx
    .get_product(product_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Product with ID {} not found.", product_id)))?;

  product.approval_status = match decision {
    ApprovalDecision::Approve => ApprovalStatus::Approved,
    ApprovalDecision::Reject => ApprovalStatus::Rejected,
  };
  product.updated_at = Utc::now();
  tx.update_product(&product).await?;

  if let Some(seller) = tx.get_seller(product.seller_id).await? {
    let verdict = match decision {
      ApprovalDecision::Approve => "approved",
      ApprovalDecision::Reject => "rejected",
    };
    notifications::create(
      tx.as_mut(),
      Recipient::User(seller.user_id),
      format!("Product {}", verdict),
      format!("'{}' was {}.", product.name, verdict),
      Some(format!("/seller/products/{}", product.id)),
    )
    .await?;
  }
  tx.commit().await?;
  info!(product_id = %product.id, ?decision, "Product reviewed.");
  Ok(product)
}

/// Unlisted products are only visible to their seller and to admins.
pub async fn get_product(store: &dyn Store, viewer: Option<&Actor>, product_id: Uuid) -> AppResult<Product> {
  let mut tx = store.begin().await?;
  let product = tx
    .get_product(product_id)
    .await?
    .filter(|p| p.is_purchasable() || viewer.map_or(false, |a| a.is_admin() || a.is_seller(p.seller_id)))
    .ok_or_else(|| AppError::NotFound(format!("Product with ID {} not found.", product_id)))?;
  Ok(product)
}

pub async fn list_public(store: &dyn Store) -> AppResult<Vec<Product>> {
  let mut tx = store.begin().await?;
  tx.list_public_products().await
}

pub async fn list_for_seller(store: &dyn Store, actor: &Actor) -> AppResult<Vec<Product>> {
  let seller_id = actor
    .seller_id
    .ok_or_else(|| AppError::Permission("Only sellers have a product list.".to_string()))?;
  let mut tx = store.begin().await?;
  tx.products_by_seller(seller_id).await
}
