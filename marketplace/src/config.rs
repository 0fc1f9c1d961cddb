// marketplace/src/config.rs

use crate::errors::{AppError, Result};
use crate::models::order::ShippingMethod;
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

/// Flat shipping charge per split order, by method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingRates {
  pub standard_cents: i64,
  pub express_cents: i64,
  pub pickup_cents: i64,
}

impl ShippingRates {
  pub fn cost_for(&self, method: ShippingMethod) -> i64 {
    match method {
      ShippingMethod::Standard => self.standard_cents,
      ShippingMethod::Express => self.express_cents,
      ShippingMethod::Pickup => self.pickup_cents,
    }
  }
}

impl Default for ShippingRates {
  fn default() -> Self {
    Self {
      standard_cents: 15_000,
      express_cents: 30_000,
      pickup_cents: 0,
    }
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// `None` runs the service on the in-memory store.
  pub database_url: Option<String>,
  pub app_base_url: String,

  /// Stock level below which a seller gets a low-stock notification.
  pub low_stock_threshold: i64,
  pub shipping_rates: ShippingRates,

  pub seed_db: bool,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      database_url: None,
      app_base_url: "http://127.0.0.1:8080".to_string(),
      low_stock_threshold: 20,
      shipping_rates: ShippingRates::default(),
      seed_db: false,
    }
  }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match env::var(name) {
    Ok(raw) => raw
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {}: {}", name, e))),
    Err(_) => Ok(default),
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    let defaults = Self::default();

    let server_host = env::var("SERVER_HOST").unwrap_or(defaults.server_host);
    let server_port = parse_var("SERVER_PORT", defaults.server_port)?;
    let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty());
    let app_base_url = env::var("APP_BASE_URL").unwrap_or_else(|_| format!("http://{}:{}", server_host, server_port));

    let low_stock_threshold = parse_var("LOW_STOCK_THRESHOLD", defaults.low_stock_threshold)?;
    if low_stock_threshold < 0 {
      return Err(AppError::Config("LOW_STOCK_THRESHOLD must not be negative".to_string()));
    }

    let shipping_rates = ShippingRates {
      standard_cents: parse_var("SHIPPING_COST_STANDARD", defaults.shipping_rates.standard_cents)?,
      express_cents: parse_var("SHIPPING_COST_EXPRESS", defaults.shipping_rates.express_cents)?,
      pickup_cents: parse_var("SHIPPING_COST_PICKUP", defaults.shipping_rates.pickup_cents)?,
    };
    if [shipping_rates.standard_cents, shipping_rates.express_cents, shipping_rates.pickup_cents]
      .iter()
      .any(|c| *c < 0)
    {
      return Err(AppError::Config("Shipping costs must not be negative".to_string()));
    }

    let seed_db = parse_var("SEED_DB", defaults.seed_db)?;

    tracing::info!(
      storage = if database_url.is_some() { "postgres" } else { "memory" },
      low_stock_threshold,
      "Application configuration loaded."
    );

    Ok(Self {
      server_host,
      server_port,
      database_url,
      app_base_url,
      low_stock_threshold,
      shipping_rates,
      seed_db,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn shipping_cost_follows_method() {
    let rates = ShippingRates::default();
    assert_eq!(rates.cost_for(ShippingMethod::Standard), 15_000);
    assert_eq!(rates.cost_for(ShippingMethod::Express), 30_000);
    assert_eq!(rates.cost_for(ShippingMethod::Pickup), 0);
  }
}
