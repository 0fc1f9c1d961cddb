// marketplace/src/services/cart.rs

use crate::errors::{AppError, Result as AppResult};
use crate::models::{Cart, CartItem, Product};
use crate::services::order_splitter::CheckoutLine;
use crate::store::{Store, StoreTx};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

/// The user's cart, created on first use.
pub async fn ensure_cart(tx: &mut dyn StoreTx, user_id: Uuid) -> AppResult<Cart> {
  if let Some(cart) = tx.cart_for_user(user_id).await? {
    return Ok(cart);
  }
  let cart = Cart {
    id: Uuid::new_v4(),
    user_id,
    created_at: Utc::now(),
  };
  tx.insert_cart(&cart).await?;
  Ok(cart)
}

/// Adds `quantity` to the product's line, creating the line if needed.
pub async fn upsert_item(tx: &mut dyn StoreTx, cart_id: Uuid, product_id: Uuid, quantity: i64) -> AppResult<CartItem> {
  let now = Utc::now();
  match tx.find_cart_item(cart_id, product_id).await? {
    Some(mut item) => {
      item.quantity += quantity;
      item.updated_at = now;
      tx.update_cart_item_quantity(item.id, item.quantity, now).await?;
      Ok(item)
    }
    None => {
      let item = CartItem {
        id: Uuid::new_v4(),
        cart_id,
        product_id,
        quantity,
        updated_at: now,
      };
      tx.insert_cart_item(&item).await?;
      Ok(item)
    }
  }
}

/// Soft check: the cart may not ask for more than is on the shelf right now.
/// Nothing is reserved.
pub fn ensure_stock_covers(product: &Product, quantity: i64) -> AppResult<()> {
  if quantity > product.stock {
    return Err(AppError::Validation(format!(
      "Insufficient stock. Only {} available.",
      product.stock
    )));
  }
  Ok(())
}

async fn owned_item(tx: &mut dyn StoreTx, user_id: Uuid, item_id: Uuid) -> AppResult<CartItem> {
  let cart = tx.cart_for_user(user_id).await?;
  let item = tx.get_cart_item(item_id).await?;
  match (cart, item) {
    (Some(cart), Some(item)) if item.cart_id == cart.id => Ok(item),
    _ => Err(AppError::NotFound(format!("Cart item with ID {} not found in your cart.", item_id))),
  }
}

#[instrument(name = "cart::set_quantity", skip(store), err)]
pub async fn set_quantity(store: &dyn Store, user_id: Uuid, item_id: Uuid, quantity: i64) -> AppResult<CartItem> {
  if quantity < 1 {
    return Err(AppError::Validation("Quantity must be at least 1.".to_string()));
  }
  let mut tx = store.begin().await?;
  let mut item = owned_item(tx.as_mut(), user_id, item_id).await?;
  let product = tx
    .get_product(item.product_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Product with ID {} not found.", item.product_id)))?;
  ensure_stock_covers(&product, quantity)?;
  item.quantity = quantity;
  item.updated_at = Utc::now();
  tx.update_cart_item_quantity(item.id, item.quantity, item.updated_at).await?;
  tx.commit().await?;
  Ok(item)
}

#[instrument(name = "cart::remove_item", skip(store), err)]
pub async fn remove_item(store: &dyn Store, user_id: Uuid, item_id: Uuid) -> AppResult<()> {
  let mut tx = store.begin().await?;
  let item = owned_item(tx.as_mut(), user_id, item_id).await?;
  tx.delete_cart_item(item.id).await?;
  tx.commit().await?;
  info!(%item_id, "Cart item removed.");
  Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
  #[serde(flatten)]
  pub item: CartItem,
  pub product_name: String,
  pub seller_id: Uuid,
  pub unit_price_cents: i64,
  pub line_total_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartView {
  pub cart_id: Option<Uuid>,
  pub items: Vec<CartLine>,
  pub total_cents: i64,
}

/// Cart lines priced at the current effective price.
pub async fn view(store: &dyn Store, user_id: Uuid) -> AppResult<CartView> {
  let mut tx = store.begin().await?;
  let Some(cart) = tx.cart_for_user(user_id).await? else {
    return Ok(CartView {
      cart_id: None,
      items: Vec::new(),
      total_cents: 0,
    });
  };

  let now = Utc::now();
  let mut items = Vec::new();
  let mut total_cents = 0_i64;
  for item in tx.cart_items(cart.id).await? {
    // Lines whose product vanished are not shown.
    let Some(product) = tx.get_product(item.product_id).await? else {
      continue;
    };
    let unit_price_cents = product.effective_price_at(now);
    let too_large = || AppError::Validation("Cart total is too large.".to_string());
    let line_total_cents = unit_price_cents.checked_mul(item.quantity).ok_or_else(too_large)?;
    total_cents = total_cents.checked_add(line_total_cents).ok_or_else(too_large)?;
    items.push(CartLine {
      line_total_cents,
      product_name: product.name,
      seller_id: product.seller_id,
      unit_price_cents,
      item,
    });
  }
  Ok(CartView {
    cart_id: Some(cart.id),
    items,
    total_cents,
  })
}

/// Turns the cart into checkout lines carrying each product's seller and
/// current price.
pub async fn checkout_lines(tx: &mut dyn StoreTx, user_id: Uuid) -> AppResult<(Cart, Vec<CheckoutLine>)> {
  let cart = tx
    .cart_for_user(user_id)
    .await?
    .ok_or_else(|| AppError::Validation("Cart is empty.".to_string()))?;
  let items = tx.cart_items(cart.id).await?;
  if items.is_empty() {
    return Err(AppError::Validation("Cart is empty.".to_string()));
  }

  let now = Utc::now();
  let mut lines = Vec::with_capacity(items.len());
  for item in items {
    let product = tx
      .get_product(item.product_id)
      .await?
      .ok_or_else(|| AppError::NotFound(format!("Product with ID {} not found.", item.product_id)))?;
    lines.push(CheckoutLine {
      product_id: product.id,
      quantity: item.quantity,
      seller_id: Some(product.seller_id),
      unit_price_cents: product.effective_price_at(now),
    });
  }
  Ok((cart, lines))
}
