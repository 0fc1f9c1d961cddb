// marketplace/src/pipelines/contexts.rs

//! Context data for every pipeline. Handlers receive these wrapped in
//! `flowline::ContextData`.
//!
//! Each context carries the run's open transaction in a [`TxSlot`]. A step
//! takes the transaction out, awaits on it and puts it back, so no lock is
//! held across an `.await`.

use crate::errors::{AppError, Result as AppResult};
use crate::models::{Actor, Cart, CartItem, Order, OrderStatus, Product};
use crate::services::fulfillment::StatusChange;
use crate::services::order_splitter::{CheckoutRequest, PlacedOrder, SellerGroup};
use crate::services::payment::{PaymentEvent, PaymentOutcome};
use crate::state::AppState;
use crate::store::StoreTx;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

pub struct TxSlot(Mutex<Option<Box<dyn StoreTx>>>);

impl TxSlot {
  pub fn new(tx: Box<dyn StoreTx>) -> Self {
    Self(Mutex::new(Some(tx)))
  }

  fn lock(&self) -> MutexGuard<'_, Option<Box<dyn StoreTx>>> {
    self.0.lock().unwrap_or_else(PoisonError::into_inner)
  }

  pub fn take(&self) -> AppResult<Box<dyn StoreTx>> {
    self
      .lock()
      .take()
      .ok_or_else(|| AppError::Internal("Pipeline transaction is not available.".to_string()))
  }

  pub fn put(&self, tx: Box<dyn StoreTx>) {
    *self.lock() = Some(tx);
  }
}

/// Contexts that run inside one storage transaction.
pub trait Transactional: Send + Sync + 'static {
  fn tx_slot(&self) -> &TxSlot;
}

macro_rules! transactional {
  ($($ctx:ty),+ $(,)?) => {
    $(impl Transactional for $ctx {
      fn tx_slot(&self) -> &TxSlot {
        &self.tx
      }
    })+
  };
}

pub struct CheckoutCtxData {
  pub app_state: AppState,
  pub tx: TxSlot,
  pub customer_id: Uuid,
  pub request: CheckoutRequest,
  /// Set when the lines came from the customer's cart, which is then emptied.
  pub source_cart_id: Option<Uuid>,
  pub groups: Vec<SellerGroup>,
  pub placed: Vec<PlacedOrder>,
}

pub struct AddToCartCtxData {
  pub app_state: AppState,
  pub tx: TxSlot,
  pub authenticated_user_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i64,
  pub product: Option<Product>,
  pub cart: Option<Cart>,
  pub updated_cart_item: Option<CartItem>,
}

pub struct StatusUpdateCtxData {
  pub app_state: AppState,
  pub tx: TxSlot,
  pub authenticated_user_id: Uuid,
  pub order_id: Uuid,
  pub new_status: OrderStatus,
  pub actor: Option<Actor>,
  pub order: Option<Order>,
  pub change: Option<StatusChange>,
}

pub struct PaymentWebhookCtxData {
  pub app_state: AppState,
  pub tx: TxSlot,
  pub source_identifier: String,
  pub raw_payload: actix_web::web::Bytes,
  pub event: Option<PaymentEvent>,
  pub outcome: Option<PaymentOutcome>,
}

transactional!(CheckoutCtxData, AddToCartCtxData, StatusUpdateCtxData, PaymentWebhookCtxData);
