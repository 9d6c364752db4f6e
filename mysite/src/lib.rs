// mysite/src/lib.rs

//! Demo shop and blog site: catalogue, orders, accounts, a JSON API and an
//! RSS feed, served by actix-web over SQLite.

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod web;

use crate::config::AppConfig;
use crate::errors::{AppError, Result as AppResult};
use crate::services::cache::SnapshotCache;
use crate::state::AppState;
use std::sync::Arc;
use std::time::Instant;

/// Connects and migrates the database, then registers every pipeline.
pub async fn build_state(config: AppConfig) -> AppResult<AppState> {
  let db_pool = db::connect(&config.database_url).await?;
  db::migrate(&db_pool).await?;

  let flows = Arc::new(flow::Registry::<AppError>::new());
  pipelines::register_all_pipelines(&flows)?;

  Ok(AppState {
    db_pool,
    flows,
    cache: Arc::new(SnapshotCache::new()),
    config: Arc::new(config),
    started_at: Instant::now(),
  })
}
