// marketplace/src/web/handlers/webhook_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::pipelines::webhook_pipeline;
use crate::state::AppState;

#[instrument(name = "handler::payment_webhook", skip(app_state, body), fields(webhook_source = %webhook_source.as_str()))]
pub async fn payment_webhook_handler(
  app_state: web::Data<AppState>,
  webhook_source: web::Path<String>,
  body: web::Bytes,
) -> Result<HttpResponse, AppError> {
  let source_identifier = webhook_source.into_inner();
  info!(
    "Received webhook for source: '{}'. Payload size: {} bytes.",
    source_identifier,
    body.len()
  );
  let outcome = webhook_pipeline::process_webhook(app_state.get_ref(), source_identifier, body).await?;
  // Ignored events are still acknowledged so the gateway stops retrying.
  Ok(HttpResponse::Ok().json(json!({ "status": "received", "result": outcome })))
}
