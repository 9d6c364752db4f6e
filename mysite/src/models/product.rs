// mysite/src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use std::fmt;

/// Prices are stored as integer cents and carried with two decimal places.
pub const PRICE_SCALE: u32 = 2;

#[derive(Debug, Clone, Serialize)]
pub struct Product {
  #[serde(rename = "pk")]
  pub id: i64,
  pub name: String,
  pub description: String,
  pub price: Decimal,
  pub discount: i32,
  pub created_at: DateTime<Utc>,
  /// Soft-delete flag. Archived products drop out of listings only.
  pub archived: bool,
  pub created_by: i64,
  pub preview: Option<String>,
}

impl<'r> FromRow<'r, SqliteRow> for Product {
  fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
    let price_cents: i64 = row.try_get("price_cents")?;
    Ok(Self {
      id: row.try_get("id")?,
      name: row.try_get("name")?,
      description: row.try_get("description")?,
      price: Decimal::new(price_cents, PRICE_SCALE),
      discount: row.try_get("discount")?,
      created_at: row.try_get("created_at")?,
      archived: row.try_get("archived")?,
      created_by: row.try_get("created_by")?,
      preview: row.try_get("preview")?,
    })
  }
}

impl fmt::Display for Product {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Product(pk={}, name='{}')", self.id, self.name)
  }
}

/// Converts a price to integer cents, rejecting anything that does not fit
/// `max_digits=8, decimal_places=2`.
pub fn price_to_cents(price: Decimal) -> Option<i64> {
  if price.is_sign_negative() || price.normalize().scale() > PRICE_SCALE {
    return None;
  }
  let cents = price.checked_mul(Decimal::ONE_HUNDRED)?.trunc();
  let cents = i64::try_from(cents).ok()?;
  if cents >= 10_i64.pow(8) {
    return None;
  }
  Some(cents)
}
