// mysite/src/errors.rs

use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use serde_json::{json, Map, Value};
use thiserror::Error;
use std::borrow::Cow;
use validator::{ValidationError, ValidationErrors};

use flow::FlowError;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  /// Per-field form errors, rendered as `{"errors": {"field": ["message"]}}`.
  #[error("Form Error: {0}")]
  Form(#[from] ValidationErrors),

  #[error("CSV Error: {0}")]
  Csv(String),

  /// Anonymous visitor hit an authenticated endpoint; `location` is the
  /// login URL with the `next` parameter already attached.
  #[error("Login required, redirecting to {location}")]
  LoginRequired { location: String },

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Migration Error: {0}")]
  Migrate(#[from] sqlx::migrate::MigrateError),

  #[error("I/O Error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),

  // A pipeline stopped gracefully where the handler needed it to complete.
  #[error("Pipeline execution was halted by a handler.")]
  PipelineHaltedByHandler,
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<sqlx::Error>() {
      Ok(sqlx_err) => AppError::Sqlx(sqlx_err),
      Err(err) => AppError::Internal(err.to_string()),
    }
  }
}

impl From<csv::Error> for AppError {
  fn from(err: csv::Error) -> Self {
    AppError::Csv(err.to_string())
  }
}

impl AppError {
  /// Maps a foreign-key violation (e.g. deleting a user who still owns
  /// orders) to `Conflict`; everything else stays a database error.
  pub fn from_constraint(err: sqlx::Error, conflict_msg: &str) -> Self {
    if let sqlx::Error::Database(db_err) = &err {
      if db_err.is_foreign_key_violation() {
        return AppError::Conflict(conflict_msg.to_string());
      }
    }
    AppError::Sqlx(err)
  }
}

/// Records one message against a form field.
pub fn push_field_error(errors: &mut ValidationErrors, field: &'static str, code: &'static str, message: impl Into<String>) {
  let message: String = message.into();
  errors.add(field, ValidationError::new(code).with_message(Cow::Owned(message)));
}

fn form_errors_json(errors: &ValidationErrors) -> Value {
  let mut fields = Map::new();
  for (field, field_errors) in errors.field_errors() {
    let messages: Vec<Value> = field_errors
      .iter()
      .map(|e| {
        let text = e.message.clone().unwrap_or_else(|| e.code.clone());
        Value::String(text.into_owned())
      })
      .collect();
    fields.insert(field.to_string(), Value::Array(messages));
  }
  json!({ "errors": fields })
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) | AppError::Form(_) | AppError::Csv(_) => StatusCode::BAD_REQUEST,
      AppError::LoginRequired { .. } => StatusCode::FOUND,
      AppError::Forbidden(_) => StatusCode::FORBIDDEN,
      AppError::NotFound(_) | AppError::Sqlx(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
      AppError::Conflict(_) | AppError::PipelineHaltedByHandler => StatusCode::CONFLICT,
      AppError::Config(_)
      | AppError::Sqlx(_)
      | AppError::Migrate(_)
      | AppError::Io(_)
      | AppError::Workflow { .. }
      | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::debug!(application_error = %self, status = status.as_u16(), "Responding with client error");
    }

    match self {
      AppError::Validation(m) | AppError::Csv(m) => HttpResponse::BadRequest().json(json!({"error": m})),
      AppError::Form(errors) => HttpResponse::BadRequest().json(form_errors_json(errors)),
      AppError::LoginRequired { location } => HttpResponse::Found()
        .insert_header((header::LOCATION, location.as_str()))
        .finish(),
      AppError::Forbidden(m) => HttpResponse::Forbidden().json(json!({"error": m})),
      AppError::NotFound(m) => HttpResponse::NotFound().json(json!({"error": m})),
      AppError::Conflict(m) => HttpResponse::Conflict().json(json!({"error": m})),
      AppError::Config(m) => {
        HttpResponse::InternalServerError().json(json!({"error": "Configuration issue", "detail": m}))
      }
      AppError::Sqlx(sqlx::Error::RowNotFound) => HttpResponse::NotFound().json(json!({"error": "Not found."})),
      AppError::Sqlx(_) | AppError::Migrate(_) => {
        HttpResponse::InternalServerError().json(json!({"error": "Database operation failed"}))
      }
      AppError::Io(_) => HttpResponse::InternalServerError().json(json!({"error": "Storage operation failed"})),
      AppError::Workflow { source } => {
        tracing::error!(flow_error_source = ?source, "Workflow error details");
        HttpResponse::InternalServerError()
          .json(json!({"error": "Workflow processing error", "detail": source.to_string()}))
      }
      AppError::Internal(m) => {
        HttpResponse::InternalServerError().json(json!({"error": "An internal error occurred", "detail": m}))
      }
      AppError::PipelineHaltedByHandler => {
        HttpResponse::Conflict().json(json!({"error": "Process halted as expected by business logic."}))
      }
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
