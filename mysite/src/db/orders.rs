// mysite/src/db/orders.rs

use crate::db::listing;
use crate::errors::{AppError, Result};
use crate::models::{Order, Product};
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqliteExecutor, SqlitePool};
use tracing::instrument;

const ORDER_COLUMNS: &str = "id, delivery_address, promocode, created_at, user_id, archived, receipt";

#[derive(Debug, Clone, Default)]
pub struct OrderFields {
  pub user_id: i64,
  pub delivery_address: Option<String>,
  pub promocode: String,
}

#[derive(Debug, Clone, Default)]
pub struct OrderQuery {
  pub search: Option<String>,
  pub delivery_address: Option<String>,
  pub promocode: Option<String>,
  pub user_id: Option<i64>,
  pub ordering: Option<String>,
}

const ORDER_ORDERING: &[(&str, &str)] = &[
  ("pk", "id"),
  ("delivery_address", "delivery_address"),
  ("promocode", "promocode"),
  ("user", "user_id"),
];

#[instrument(name = "db::orders::insert", skip(executor, fields), fields(user_id = fields.user_id), err(Display))]
pub async fn insert(executor: impl SqliteExecutor<'_>, fields: &OrderFields) -> Result<Order> {
  let sql = format!(
    "INSERT INTO orders (delivery_address, promocode, created_at, user_id, archived) \
     VALUES (?, ?, ?, ?, 0) RETURNING {}",
    ORDER_COLUMNS
  );
  let order = sqlx::query_as::<_, Order>(&sql)
    .bind(&fields.delivery_address)
    .bind(&fields.promocode)
    .bind(Utc::now())
    .bind(fields.user_id)
    .fetch_one(executor)
    .await
    .map_err(|e| AppError::from_constraint(e, "Order owner does not exist."))?;
  Ok(order)
}

pub async fn find_by_id(pool: &SqlitePool, order_id: i64) -> Result<Option<Order>> {
  let sql = format!("SELECT {} FROM orders WHERE id = ?", ORDER_COLUMNS);
  Ok(sqlx::query_as::<_, Order>(&sql).bind(order_id).fetch_optional(pool).await?)
}

pub async fn get_by_id(pool: &SqlitePool, order_id: i64) -> Result<Order> {
  find_by_id(pool, order_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Order {} not found.", order_id)))
}

/// Finds the order a user already has for this address and promocode.
pub async fn find_matching(
  executor: impl SqliteExecutor<'_>,
  user_id: i64,
  delivery_address: &str,
  promocode: &str,
) -> Result<Option<Order>> {
  let sql = format!(
    "SELECT {} FROM orders WHERE user_id = ? AND delivery_address = ? AND promocode = ? ORDER BY id LIMIT 1",
    ORDER_COLUMNS
  );
  let order = sqlx::query_as::<_, Order>(&sql)
    .bind(user_id)
    .bind(delivery_address)
    .bind(promocode)
    .fetch_optional(executor)
    .await?;
  Ok(order)
}

/// Orders shown in the order list. `owner` restricts to one user's orders.
pub async fn list_active(pool: &SqlitePool, owner: Option<i64>) -> Result<Vec<Order>> {
  let mut qb: QueryBuilder<'_, Sqlite> =
    QueryBuilder::new(format!("SELECT {} FROM orders WHERE archived = 0", ORDER_COLUMNS));
  if let Some(user_id) = owner {
    qb.push(" AND user_id = ").push_bind(user_id);
  }
  qb.push(" ORDER BY id");
  Ok(qb.build_query_as::<Order>().fetch_all(pool).await?)
}

/// Every order in ascending id order.
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Order>> {
  let sql = format!("SELECT {} FROM orders ORDER BY id", ORDER_COLUMNS);
  Ok(sqlx::query_as::<_, Order>(&sql).fetch_all(pool).await?)
}

pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Order>> {
  let sql = format!("SELECT {} FROM orders WHERE user_id = ? ORDER BY id", ORDER_COLUMNS);
  Ok(sqlx::query_as::<_, Order>(&sql).bind(user_id).fetch_all(pool).await?)
}

#[instrument(name = "db::orders::query", skip(pool), err(Display))]
pub async fn query(pool: &SqlitePool, filter: &OrderQuery) -> Result<Vec<Order>> {
  let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(format!("SELECT {} FROM orders WHERE 1 = 1", ORDER_COLUMNS));

  listing::push_search(
    &mut qb,
    filter.search.as_deref(),
    &["CAST(id AS TEXT)", "delivery_address"],
  );

  if let Some(delivery_address) = &filter.delivery_address {
    qb.push(" AND delivery_address = ").push_bind(delivery_address.clone());
  }
  if let Some(promocode) = &filter.promocode {
    qb.push(" AND promocode = ").push_bind(promocode.clone());
  }
  if let Some(user_id) = filter.user_id {
    qb.push(" AND user_id = ").push_bind(user_id);
  }

  qb.push(" ORDER BY ");
  qb.push(listing::order_by(filter.ordering.as_deref(), ORDER_ORDERING, "id ASC"));

  Ok(qb.build_query_as::<Order>().fetch_all(pool).await?)
}

pub async fn update(executor: impl SqliteExecutor<'_>, order_id: i64, fields: &OrderFields) -> Result<Order> {
  let sql = format!(
    "UPDATE orders SET user_id = ?, delivery_address = ?, promocode = ? WHERE id = ? RETURNING {}",
    ORDER_COLUMNS
  );
  sqlx::query_as::<_, Order>(&sql)
    .bind(fields.user_id)
    .bind(&fields.delivery_address)
    .bind(&fields.promocode)
    .bind(order_id)
    .fetch_optional(executor)
    .await
    .map_err(|e| AppError::from_constraint(e, "Order owner does not exist."))?
    .ok_or_else(|| AppError::NotFound(format!("Order {} not found.", order_id)))
}

pub async fn set_archived(pool: &SqlitePool, order_id: i64, archived: bool) -> Result<()> {
  let result = sqlx::query("UPDATE orders SET archived = ? WHERE id = ?")
    .bind(archived)
    .bind(order_id)
    .execute(pool)
    .await?;
  if result.rows_affected() == 0 {
    return Err(AppError::NotFound(format!("Order {} not found.", order_id)));
  }
  Ok(())
}

/// Replaces the order's product set. Takes a connection so callers can run
/// it inside their transaction.
pub async fn set_products(conn: &mut SqliteConnection, order_id: i64, product_ids: &[i64]) -> Result<()> {
  sqlx::query("DELETE FROM order_products WHERE order_id = ?")
    .bind(order_id)
    .execute(&mut *conn)
    .await?;
  for product_id in product_ids {
    sqlx::query("INSERT OR IGNORE INTO order_products (order_id, product_id) VALUES (?, ?)")
      .bind(order_id)
      .bind(*product_id)
      .execute(&mut *conn)
      .await
      .map_err(|e| AppError::from_constraint(e, "Order references an unknown product."))?;
  }
  Ok(())
}

pub async fn product_ids(pool: &SqlitePool, order_id: i64) -> Result<Vec<i64>> {
  let ids = sqlx::query_scalar::<_, i64>("SELECT product_id FROM order_products WHERE order_id = ? ORDER BY product_id")
    .bind(order_id)
    .fetch_all(pool)
    .await?;
  Ok(ids)
}

/// Products of an order, archived ones included.
pub async fn products_of(pool: &SqlitePool, order_id: i64) -> Result<Vec<Product>> {
  let products = sqlx::query_as::<_, Product>(
    "SELECT p.id, p.name, p.description, p.price_cents, p.discount, p.created_at, p.archived, p.created_by, p.preview \
     FROM products p JOIN order_products op ON op.product_id = p.id \
     WHERE op.order_id = ? ORDER BY p.id",
  )
  .bind(order_id)
  .fetch_all(pool)
  .await?;
  Ok(products)
}
