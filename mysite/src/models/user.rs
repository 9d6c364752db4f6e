// mysite/src/models/user.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
  #[serde(rename = "pk")]
  pub id: i64,
  pub username: String,
  #[serde(skip_serializing)] // Never send password hash to client
  pub password_hash: String,
  pub first_name: String,
  pub last_name: String,
  pub email: String,
  pub is_staff: bool,
  pub is_superuser: bool,
  pub is_active: bool,
  pub date_joined: DateTime<Utc>,
}
