// mysite/src/models/group.rs

use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Group {
  #[serde(rename = "pk")]
  pub id: i64,
  pub name: String,
}
