// mysite/src/state.rs
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::services::cache::SnapshotCache;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct AppState {
  pub db_pool: SqlitePool,
  pub flows: Arc<flow::Registry<AppError>>,
  pub cache: Arc<SnapshotCache>,
  pub config: Arc<AppConfig>, // Share loaded config
  /// Process start, reported as uptime by the shop index.
  pub started_at: Instant,
}
