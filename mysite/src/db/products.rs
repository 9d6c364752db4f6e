// mysite/src/db/products.rs

use crate::db::listing;
use crate::errors::{AppError, Result};
use crate::models::Product;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};
use tracing::instrument;

const PRODUCT_COLUMNS: &str =
  "id, name, description, price_cents, discount, created_at, archived, created_by, preview";

/// Editable product fields, already validated.
#[derive(Debug, Clone, Default)]
pub struct ProductFields {
  pub name: String,
  pub description: String,
  pub price_cents: i64,
  pub discount: i32,
  pub preview: Option<String>,
}

/// API list filters. `None` means "not filtered".
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
  pub search: Option<String>,
  pub name: Option<String>,
  pub description: Option<String>,
  pub price_cents: Option<i64>,
  pub discount: Option<i32>,
  pub archived: Option<bool>,
  pub ordering: Option<String>,
}

const PRODUCT_ORDERING: &[(&str, &str)] = &[("name", "name"), ("price", "price_cents"), ("discount", "discount")];

#[instrument(name = "db::products::insert", skip(executor, fields), fields(name = %fields.name), err(Display))]
pub async fn insert(executor: impl SqliteExecutor<'_>, fields: &ProductFields, created_by: i64) -> Result<Product> {
  let sql = format!(
    "INSERT INTO products (name, description, price_cents, discount, created_at, archived, created_by, preview) \
     VALUES (?, ?, ?, ?, ?, 0, ?, ?) RETURNING {}",
    PRODUCT_COLUMNS
  );
  let product = sqlx::query_as::<_, Product>(&sql)
    .bind(&fields.name)
    .bind(&fields.description)
    .bind(fields.price_cents)
    .bind(fields.discount)
    .bind(Utc::now())
    .bind(created_by)
    .bind(&fields.preview)
    .fetch_one(executor)
    .await?;
  Ok(product)
}

pub async fn find_by_id(pool: &SqlitePool, product_id: i64) -> Result<Option<Product>> {
  let sql = format!("SELECT {} FROM products WHERE id = ?", PRODUCT_COLUMNS);
  Ok(sqlx::query_as::<_, Product>(&sql).bind(product_id).fetch_optional(pool).await?)
}

/// Archived products are still found here.
pub async fn get_by_id(pool: &SqlitePool, product_id: i64) -> Result<Product> {
  find_by_id(pool, product_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Product {} not found.", product_id)))
}

/// Products shown in the product list: everything not archived, by name.
pub async fn list_active(pool: &SqlitePool) -> Result<Vec<Product>> {
  let sql = format!("SELECT {} FROM products WHERE archived = 0 ORDER BY name, id", PRODUCT_COLUMNS);
  Ok(sqlx::query_as::<_, Product>(&sql).fetch_all(pool).await?)
}

/// Every product, archived or not, in ascending id order.
pub async fn list_all(executor: impl SqliteExecutor<'_>) -> Result<Vec<Product>> {
  let sql = format!("SELECT {} FROM products ORDER BY id", PRODUCT_COLUMNS);
  Ok(sqlx::query_as::<_, Product>(&sql).fetch_all(executor).await?)
}

#[instrument(name = "db::products::query", skip(pool), err(Display))]
pub async fn query(pool: &SqlitePool, filter: &ProductQuery) -> Result<Vec<Product>> {
  let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(format!("SELECT {} FROM products WHERE 1 = 1", PRODUCT_COLUMNS));

  listing::push_search(&mut qb, filter.search.as_deref(), &["name", "description"]);

  if let Some(name) = &filter.name {
    qb.push(" AND name = ").push_bind(name.clone());
  }
  if let Some(description) = &filter.description {
    qb.push(" AND description = ").push_bind(description.clone());
  }
  if let Some(price_cents) = filter.price_cents {
    qb.push(" AND price_cents = ").push_bind(price_cents);
  }
  if let Some(discount) = filter.discount {
    qb.push(" AND discount = ").push_bind(discount);
  }
  if let Some(archived) = filter.archived {
    qb.push(" AND archived = ").push_bind(archived);
  }

  qb.push(" ORDER BY ");
  qb.push(listing::order_by(filter.ordering.as_deref(), PRODUCT_ORDERING, "name ASC"));

  Ok(qb.build_query_as::<Product>().fetch_all(pool).await?)
}

pub async fn update(pool: &SqlitePool, product_id: i64, fields: &ProductFields) -> Result<Product> {
  let sql = format!(
    "UPDATE products SET name = ?, description = ?, price_cents = ?, discount = ?, preview = COALESCE(?, preview) \
     WHERE id = ? RETURNING {}",
    PRODUCT_COLUMNS
  );
  sqlx::query_as::<_, Product>(&sql)
    .bind(&fields.name)
    .bind(&fields.description)
    .bind(fields.price_cents)
    .bind(fields.discount)
    .bind(&fields.preview)
    .bind(product_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Product {} not found.", product_id)))
}

/// Sets the soft-delete flag. Setting it twice is a no-op.
pub async fn set_archived(pool: &SqlitePool, product_id: i64, archived: bool) -> Result<()> {
  let result = sqlx::query("UPDATE products SET archived = ? WHERE id = ?")
    .bind(archived)
    .bind(product_id)
    .execute(pool)
    .await?;
  if result.rows_affected() == 0 {
    return Err(AppError::NotFound(format!("Product {} not found.", product_id)));
  }
  Ok(())
}

/// Bulk variant of `set_archived`; returns how many rows matched.
pub async fn set_archived_many(pool: &SqlitePool, product_ids: &[i64], archived: bool) -> Result<u64> {
  if product_ids.is_empty() {
    return Ok(0);
  }
  let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new("UPDATE products SET archived = ");
  qb.push_bind(archived).push(" WHERE id IN (");
  let mut separated = qb.separated(", ");
  for id in product_ids {
    separated.push_bind(*id);
  }
  separated.push_unseparated(")");
  Ok(qb.build().execute(pool).await?.rows_affected())
}

/// Sets `discount` on every product whose name contains `name_contains`.
pub async fn set_discount_where_name_contains(pool: &SqlitePool, name_contains: &str, discount: i32) -> Result<u64> {
  let result = sqlx::query("UPDATE products SET discount = ? WHERE name LIKE ? ESCAPE '\\'")
    .bind(discount)
    .bind(listing::contains_pattern(name_contains))
    .execute(pool)
    .await?;
  Ok(result.rows_affected())
}
