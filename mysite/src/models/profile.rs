// mysite/src/models/profile.rs

use serde::Serialize;
use sqlx::FromRow;

/// One per user, created together with the account.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Profile {
  #[serde(rename = "pk")]
  pub id: i64,
  #[serde(rename = "user")]
  pub user_id: i64,
  pub bio: String,
  /// Path relative to the media root.
  pub avatar: Option<String>,
}
