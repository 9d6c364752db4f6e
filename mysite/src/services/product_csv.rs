// mysite/src/services/product_csv.rs

//! Product CSV export and import parsing.

use crate::db::products::ProductFields;
use crate::errors::{AppError, Result};
use crate::models::product::{price_to_cents, Product};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, instrument};

pub const EXPORT_FILENAME: &str = "products-export.csv";
pub const NAME_MAX_LEN: usize = 100;

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
  name: &'a str,
  description: &'a str,
  price: String,
  discount: i32,
}

/// Writes `name,description,price,discount` with a header row.
#[instrument(name = "product_csv::export", skip_all, fields(rows = products.len()), err(Display))]
pub fn export_products(products: &[Product]) -> Result<Vec<u8>> {
  let mut writer = csv::Writer::from_writer(Vec::new());
  if products.is_empty() {
    writer.write_record(["name", "description", "price", "discount"])?;
  }
  for product in products {
    writer.serialize(ExportRow {
      name: &product.name,
      description: &product.description,
      price: product.price.to_string(),
      discount: product.discount,
    })?;
  }
  writer
    .into_inner()
    .map_err(|e| AppError::Internal(format!("Failed to finish CSV export: {}", e)))
}

/// One CSV row. Unknown columns are ignored; only `name` is required.
#[derive(Debug, Deserialize)]
struct ImportRow {
  name: Option<String>,
  #[serde(default)]
  description: Option<String>,
  #[serde(default)]
  price: Option<String>,
  #[serde(default)]
  discount: Option<String>,
}

/// Parses and validates an uploaded CSV. Any bad row rejects the whole file.
#[instrument(name = "product_csv::parse", skip_all, fields(bytes = data.len()), err(Display))]
pub fn parse_products(data: &[u8]) -> Result<Vec<ProductFields>> {
  let mut reader = csv::ReaderBuilder::new().has_headers(true).trim(csv::Trim::All).from_reader(data);

  let headers = reader.headers()?.clone();
  if !headers.iter().any(|h| h == "name") {
    return Err(AppError::Csv("CSV header must contain a 'name' column.".to_string()));
  }

  let mut parsed = Vec::new();
  for (index, record) in reader.deserialize::<ImportRow>().enumerate() {
    // Header is line 1.
    let line = index + 2;
    let row = record.map_err(|e| AppError::Csv(format!("Line {}: {}", line, e)))?;
    parsed.push(validate_row(row).map_err(|msg| AppError::Csv(format!("Line {}: {}", line, msg)))?);
  }
  debug!(rows = parsed.len(), "CSV parsed.");
  Ok(parsed)
}

fn validate_row(row: ImportRow) -> std::result::Result<ProductFields, String> {
  let name = row.name.unwrap_or_default();
  if name.is_empty() {
    return Err("name is required.".to_string());
  }
  if name.chars().count() > NAME_MAX_LEN {
    return Err(format!("name must have at most {} characters.", NAME_MAX_LEN));
  }

  let price_cents = match row.price.as_deref().filter(|p| !p.is_empty()) {
    None => 0,
    Some(raw) => Decimal::from_str(raw)
      .ok()
      .and_then(price_to_cents)
      .ok_or_else(|| format!("'{}' is not a valid price.", raw))?,
  };

  let discount = match row.discount.as_deref().filter(|d| !d.is_empty()) {
    None => 0,
    Some(raw) => raw
      .parse::<i16>()
      .map(i32::from)
      .map_err(|_| format!("'{}' is not a valid discount.", raw))?,
  };

  Ok(ProductFields {
    name,
    description: row.description.unwrap_or_default(),
    price_cents,
    discount,
    preview: None,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;

  #[test]
  fn parse_applies_defaults_and_ignores_unknown_columns() {
    let data = b"name,price,color\nLamp,12.50,red\nChair,,blue\n";
    let rows = parse_products(data).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].name, "Lamp");
    assert_eq!(rows[0].price_cents, 1250);
    assert_eq!(rows[1].price_cents, 0);
    assert_eq!(rows[1].discount, 0);
    assert_eq!(rows[1].description, "");
  }

  #[test]
  fn one_bad_row_rejects_the_file() {
    let data = b"name,description,price,discount\nLamp,ok,1.00,0\n,missing name,2.00,0\n";
    let err = parse_products(data).unwrap_err();
    assert!(matches!(err, AppError::Csv(ref m) if m.starts_with("Line 3")));

    let data = b"name,price\nLamp,cheap\n";
    assert!(matches!(parse_products(data), Err(AppError::Csv(_))));
  }

  #[test]
  fn header_without_name_is_rejected() {
    assert!(matches!(parse_products(b"title,price\nx,1\n"), Err(AppError::Csv(_))));
  }

  #[test]
  fn export_writes_header_and_prices() {
    let product = Product {
      id: 1,
      name: "Lamp".to_string(),
      description: "Warm, bright".to_string(),
      price: Decimal::new(1250, 2),
      discount: 5,
      created_at: Utc::now(),
      archived: false,
      created_by: 1,
      preview: None,
    };
    let text = String::from_utf8(export_products(&[product]).unwrap()).unwrap();
    assert_eq!(text, "name,description,price,discount\nLamp,\"Warm, bright\",12.50,5\n");

    let empty = String::from_utf8(export_products(&[]).unwrap()).unwrap();
    assert_eq!(empty, "name,description,price,discount\n");
  }
}
