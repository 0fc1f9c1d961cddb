// marketplace/src/pipelines/mod.rs

//! Defines and registers the flowline pipelines behind the multi-step
//! operations: checkout, add-to-cart, order status updates and payment
//! webhooks.

use crate::errors::AppError;
use flowline::Flowline;

pub mod common_steps;
pub mod contexts;

pub mod cart_pipeline;
pub mod checkout_pipeline;
pub mod fulfillment_pipeline;
pub mod webhook_pipeline;

/// Registers every pipeline. Called once when the application state is
/// built.
pub fn register_all_pipelines(flow: &Flowline<AppError>) {
  tracing::info!("Registering flowline pipelines...");

  checkout_pipeline::register_checkout_pipeline(flow);
  cart_pipeline::register_add_to_cart_pipeline(flow);
  fulfillment_pipeline::register_status_update_pipeline(flow);
  webhook_pipeline::register_webhook_pipeline(flow);

  tracing::info!("All application pipelines registered.");
}
