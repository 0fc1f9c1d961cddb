// marketplace/src/errors.rs

use crate::models::order::OrderStatus;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use flowline::FlowError;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Permission Denied: {0}")]
  Permission(String),

  #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
  InsufficientStock {
    product_id: Uuid,
    requested: i64,
    available: i64,
  },

  #[error("Invalid status transition from '{from}' to '{to}'")]
  State { from: OrderStatus, to: OrderStatus },

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),

  #[error("Pipeline execution was halted by a handler.")]
  PipelineHaltedByHandler,
}

impl AppError {
  /// Stable machine-readable code for clients.
  pub fn code(&self) -> &'static str {
    match self {
      AppError::Validation(_) => "validation_error",
      AppError::Auth(_) => "auth_error",
      AppError::NotFound(_) => "not_found",
      AppError::Permission(_) => "permission_denied",
      AppError::InsufficientStock { .. } => "insufficient_stock",
      AppError::State { .. } => "invalid_state_transition",
      AppError::Config(_) => "configuration_error",
      AppError::Sqlx(_) => "database_error",
      AppError::Workflow { .. } => "workflow_error",
      AppError::Internal(_) => "internal_error",
      AppError::PipelineHaltedByHandler => "pipeline_halted",
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Permission(_) => StatusCode::FORBIDDEN,
      AppError::InsufficientStock { .. } | AppError::State { .. } | AppError::PipelineHaltedByHandler => {
        StatusCode::CONFLICT
      }
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Workflow { .. } | AppError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, "Responding with error");
    }

    let body = match self {
      // Do not leak driver details to clients.
      AppError::Sqlx(_) => json!({"error": "Database operation failed", "code": self.code()}),
      AppError::InsufficientStock {
        product_id,
        requested,
        available,
      } => json!({
        "error": self.to_string(),
        "code": self.code(),
        "productId": product_id,
        "requested": requested,
        "available": available,
      }),
      AppError::State { from, to } => json!({
        "error": self.to_string(),
        "code": self.code(),
        "from": from,
        "to": to,
      }),
      _ => json!({"error": self.to_string(), "code": self.code()}),
    };
    HttpResponse::build(status).json(body)
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
