// mysite/src/db/mod.rs

//! Explicit SQL over the SQLite pool, one module per table group.

pub mod articles;
pub mod groups;
pub mod listing;
pub mod orders;
pub mod products;
pub mod profiles;
pub mod sessions;
pub mod users;

use crate::errors::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::instrument;

/// Opens the pool. An in-memory database lives as long as its single
/// connection, so that connection is never recycled.
#[instrument(name = "db::connect", skip_all, err(Display))]
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
  let options = SqliteConnectOptions::from_str(database_url)?
    .create_if_missing(true)
    .foreign_keys(true);

  let pool_options = if database_url.contains(":memory:") {
    SqlitePoolOptions::new()
      .max_connections(1)
      .idle_timeout(None)
      .max_lifetime(None)
  } else {
    SqlitePoolOptions::new().max_connections(5)
  };

  let pool = pool_options.connect_with(options).await?;
  tracing::info!("Successfully connected to the database.");
  Ok(pool)
}

#[instrument(name = "db::migrate", skip_all, err(Display))]
pub async fn migrate(pool: &SqlitePool) -> Result<()> {
  sqlx::migrate!("./migrations").run(pool).await?;
  tracing::info!("Database migrations applied.");
  Ok(())
}
