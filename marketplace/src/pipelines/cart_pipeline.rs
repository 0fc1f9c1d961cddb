// marketplace/src/pipelines/cart_pipeline.rs

use crate::errors::{AppError, Result as AppResult};
use crate::models::CartItem;
use crate::pipelines::common_steps::{return_tx, run_in_transaction, take_tx};
use crate::pipelines::contexts::{AddToCartCtxData, TxSlot};
use crate::services::cart;
use crate::state::AppState;
use flowline::{ContextData, Flowline, Pipeline, PipelineControl};
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub fn register_add_to_cart_pipeline(flow: &Flowline<AppError>) {
  let mut p = Pipeline::<AddToCartCtxData, AppError>::new(&[
    ("validate_cart_input", false, None),
    ("fetch_product_for_cart", false, None),
    ("check_product_stock_for_cart", false, None),
    ("add_or_update_cart_item", false, None),
  ]);

  // Step 1: quantity must be positive
  p.on("validate_cart_input", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let quantity = { ctx_data.read().quantity };
      if quantity < 1 {
        warn!("Add to Cart Pipeline: Invalid quantity ({}) provided.", quantity);
        return Err(AppError::Validation("Quantity must be a positive number.".to_string()));
      }
      Ok(PipelineControl::Continue)
    })
  });

  // Step 2: the product must exist and be on sale
  p.on("fetch_product_for_cart", fetch_product_for_cart);

  // Step 3: soft stock check against what the cart would then hold
  p.on("check_product_stock_for_cart", check_product_stock_for_cart);

  // Step 4: upsert the cart line
  p.on("add_or_update_cart_item", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let (cart_id, product_id, quantity) = {
        let guard = ctx_data.read();
        let cart_id = guard
          .cart
          .as_ref()
          .map(|c| c.id)
          .ok_or_else(|| AppError::Internal("Cart was not resolved before upsert.".to_string()))?;
        (cart_id, guard.product_id, guard.quantity)
      };

      let mut tx = take_tx(&ctx_data)?;
      let item = cart::upsert_item(tx.as_mut(), cart_id, product_id, quantity).await?;
      return_tx(&ctx_data, tx);

      info!(
        "Add to Cart Pipeline: cart item {} (product {}) now has quantity {}.",
        item.id, product_id, item.quantity
      );
      ctx_data.write().updated_cart_item = Some(item);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  flow.register_pipeline(p);
  info!("Add to Cart pipeline registered.");
}

async fn fetch_product_for_cart(ctx_data: ContextData<AddToCartCtxData>) -> AppResult<PipelineControl> {
  let product_id = { ctx_data.read().product_id };
  let mut tx = take_tx(&ctx_data)?;
  let product = tx.get_product(product_id).await?;
  return_tx(&ctx_data, tx);

  let product = product.ok_or_else(|| {
    warn!("Add to Cart Pipeline: Product {} not found.", product_id);
    AppError::NotFound(format!("Product with ID {} not found.", product_id))
  })?;
  if !product.is_purchasable() {
    return Err(AppError::Validation(format!(
      "Product {} is not available for purchase.",
      product_id
    )));
  }
  ctx_data.write().product = Some(product);
  Ok(PipelineControl::Continue)
}

async fn check_product_stock_for_cart(ctx_data: ContextData<AddToCartCtxData>) -> AppResult<PipelineControl> {
  let (user_id, quantity, product) = {
    let guard = ctx_data.read();
    let product = guard
      .product
      .clone()
      .ok_or_else(|| AppError::Internal("Product was not loaded before the stock check.".to_string()))?;
    (guard.authenticated_user_id, guard.quantity, product)
  };

  let mut tx = take_tx(&ctx_data)?;
  let user_cart = cart::ensure_cart(tx.as_mut(), user_id).await?;
  let in_cart = tx
    .find_cart_item(user_cart.id, product.id)
    .await?
    .map_or(0, |item| item.quantity);
  return_tx(&ctx_data, tx);

  cart::ensure_stock_covers(&product, in_cart.saturating_add(quantity)).map_err(|e| {
    warn!(
      "Add to Cart Pipeline: Insufficient stock for product {}. Available: {}, In cart: {}, Requested: {}.",
      product.id, product.stock, in_cart, quantity
    );
    e
  })?;
  ctx_data.write().cart = Some(user_cart);
  Ok(PipelineControl::Continue)
}

/// Adds `quantity` of a product to the user's cart.
#[instrument(name = "cart::add_item", skip(app_state), err)]
pub async fn add_to_cart(app_state: &AppState, user_id: Uuid, product_id: Uuid, quantity: i64) -> AppResult<CartItem> {
  let tx = app_state.store.begin().await?;
  let ctx_data = ContextData::new(AddToCartCtxData {
    app_state: app_state.clone(),
    tx: TxSlot::new(tx),
    authenticated_user_id: user_id,
    product_id,
    quantity,
    product: None,
    cart: None,
    updated_cart_item: None,
  });
  run_in_transaction(app_state, ctx_data.clone()).await?;

  let item = ctx_data.write().updated_cart_item.take();
  item.ok_or_else(|| AppError::Internal("Cart update completed, but item details are unavailable.".to_string()))
}
