// mysite/src/models/order.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use std::fmt;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
  #[serde(rename = "pk")]
  pub id: i64,
  pub delivery_address: Option<String>,
  pub promocode: String,
  pub created_at: DateTime<Utc>,
  #[serde(rename = "user")]
  pub user_id: i64,
  pub archived: bool,
  pub receipt: Option<String>,
}

impl fmt::Display for Order {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Order(pk={})", self.id)
  }
}

/// An order together with the ids of its products, as the API returns it.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithProducts {
  #[serde(flatten)]
  pub order: Order,
  pub products: Vec<i64>,
}
