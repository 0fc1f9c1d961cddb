// marketplace/src/main.rs

use anyhow::Context;
use marketplace::config::AppConfig;
use marketplace::services::seed;
use marketplace::state::AppState;
use marketplace::store::{MemoryStore, PgStore, Store};
use marketplace::web;

use actix_web::{web as actix_data, App, HttpServer};
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting marketplace server...");

  let app_config = AppConfig::from_env().context("loading configuration")?;

  let store: Arc<dyn Store> = match &app_config.database_url {
    Some(url) => {
      let pg = PgStore::connect(url).await.context("connecting to the database")?;
      pg.migrate().await.context("applying the database schema")?;
      Arc::new(pg)
    }
    None => {
      tracing::warn!("DATABASE_URL not set, using the in-memory store. Data is lost on exit.");
      Arc::new(MemoryStore::new())
    }
  };

  if app_config.seed_db {
    seed::seed_demo_data(store.as_ref()).await.context("seeding demo data")?;
  }

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  let app_state = AppState::new(store, app_config);

  tracing::info!("Binding server to {}...", server_address);
  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)
  .with_context(|| format!("binding {}", server_address))?
  .run()
  .await?;

  Ok(())
}
