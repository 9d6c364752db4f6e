// mysite/src/db/sessions.rs

use crate::errors::Result;
use chrono::{DateTime, Duration, Utc};
use sqlx::{FromRow, SqliteExecutor, SqlitePool};
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
  pub token: String,
  pub user_id: i64,
  pub created_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}

impl SessionRow {
  pub fn is_expired(&self) -> bool {
    self.expires_at <= Utc::now()
  }
}

/// Opens a session for `user_id` and returns its token.
pub async fn create(executor: impl SqliteExecutor<'_>, user_id: i64, ttl_secs: i64) -> Result<String> {
  let token = Uuid::new_v4().simple().to_string();
  let now = Utc::now();
  sqlx::query("INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)")
    .bind(&token)
    .bind(user_id)
    .bind(now)
    .bind(now + Duration::seconds(ttl_secs))
    .execute(executor)
    .await?;
  Ok(token)
}

pub async fn find(pool: &SqlitePool, token: &str) -> Result<Option<SessionRow>> {
  let row = sqlx::query_as::<_, SessionRow>("SELECT token, user_id, created_at, expires_at FROM sessions WHERE token = ?")
    .bind(token)
    .fetch_optional(pool)
    .await?;
  Ok(row)
}

pub async fn delete(pool: &SqlitePool, token: &str) -> Result<()> {
  sqlx::query("DELETE FROM sessions WHERE token = ?")
    .bind(token)
    .execute(pool)
    .await?;
  Ok(())
}
