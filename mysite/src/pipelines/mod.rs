// mysite/src/pipelines/mod.rs

//! Defines and registers the application's multi-step flows.

use crate::errors::{AppError, Result as AppResult};
use flow::Registry;

pub mod common_steps;
pub mod contexts;

pub mod csv_import_pipeline;
pub mod order_bundle_pipeline;
pub mod registration_pipeline;
pub mod signin_pipeline;

/// Registers every pipeline. Called once at startup (and per test app).
pub fn register_all_pipelines(registry: &Registry<AppError>) -> AppResult<()> {
  tracing::info!("Registering pipelines...");

  registration_pipeline::register_registration_pipeline(registry)?;
  signin_pipeline::register_signin_pipeline(registry)?;
  csv_import_pipeline::register_csv_import_pipeline(registry)?;
  order_bundle_pipeline::register_order_bundle_pipeline(registry)?;

  tracing::info!(count = registry.len(), "All application pipelines registered.");
  Ok(())
}
