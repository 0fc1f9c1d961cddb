// marketplace/src/lib.rs

//! Multi-vendor marketplace backend: catalog, carts, per-seller order
//! splitting, fulfillment, reviews and notifications over actix-web.

pub mod config;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod store;
pub mod web;

pub use crate::config::AppConfig;
pub use crate::errors::{AppError, Result};
pub use crate::state::AppState;
