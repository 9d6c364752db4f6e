// mysite/src/web/handlers/request_data_handlers.rs

//! Request-data playground: query params, a form and a file upload.

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::services::uploads;
use crate::state::AppState;
use crate::web::forms::UserBioForm;

pub const UPLOAD_FIELD: &str = "myfile";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConcatParams {
  pub a: String,
  pub b: String,
}

/// Echoes `a` and `b` and their concatenation.
pub async fn process_get_handler(params: web::Query<ConcatParams>) -> HttpResponse {
  let ConcatParams { a, b } = params.into_inner();
  let result = format!("{}{}", a, b);
  HttpResponse::Ok().json(json!({ "a": a, "b": b, "result": result }))
}

pub async fn user_bio_form_handler() -> HttpResponse {
  HttpResponse::Ok().json(json!({ "form": { "fields": ["name", "age", "bio"] } }))
}

pub async fn user_bio_submit_handler(form: web::Form<UserBioForm>) -> Result<HttpResponse, AppError> {
  let form = form.into_inner().check()?;
  Ok(HttpResponse::Ok().json(json!({
    "name": form.name,
    "age": form.age,
    "bio": form.bio,
  })))
}

pub async fn file_upload_form_handler() -> HttpResponse {
  HttpResponse::Ok().json(json!({ "form": { "fields": [UPLOAD_FIELD] } }))
}

/// Stores `myfile` under the media root. Suspicious names are refused up
/// front; oversized files are stored, measured, deleted and refused.
#[instrument(name = "handler::file_upload", skip_all, err(Display))]
pub async fn file_upload_handler(
  app_state: web::Data<AppState>,
  payload: Multipart,
) -> Result<HttpResponse, AppError> {
  let stored = uploads::store_field(payload, UPLOAD_FIELD, &app_state.config.media_root, "").await?;
  info!(file = %stored.name, size = stored.size, "file saved");
  Ok(HttpResponse::Ok().json(json!({
    "saved_as": stored.name,
    "size": stored.size,
  })))
}

pub async fn error_upload_handler() -> HttpResponse {
  HttpResponse::Ok().json(json!({
    "error": "File upload failed",
    "detail": format!("Files must be at most {} bytes.", uploads::MAX_UPLOAD_BYTES),
  }))
}

pub async fn error_request_handler() -> HttpResponse {
  HttpResponse::Ok().json(json!({
    "error": "Request could not be processed",
  }))
}
