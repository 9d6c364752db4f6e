// mysite/src/web/handlers/export_handlers.rs

//! JSON data exports. Products and per-user orders go through the snapshot
//! cache.

use actix_web::{web, HttpResponse};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::db;
use crate::errors::AppError;
use crate::state::AppState;

pub const PRODUCTS_EXPORT_KEY: &str = "products_data_export";
pub const USER_ORDERS_KEY: &str = "user_orders";
const EXPORT_TTL_SECS: u64 = 300;

/// Serves the cached snapshot when present, otherwise recomputes it in
/// ascending id order. The snapshot is stored again on every request.
#[instrument(name = "handler::products_export", skip_all, err(Display))]
pub async fn products_export_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let products_data = match app_state.cache.get::<Value>(PRODUCTS_EXPORT_KEY) {
    Some(cached) => {
      debug!("Products export served from cache.");
      cached
    }
    None => {
      let products = db::products::list_all(&app_state.db_pool).await?;
      let rows: Vec<Value> = products
        .iter()
        .map(|p| {
          json!({
            "pk": p.id,
            "name": p.name,
            "price": p.price.to_string(),
            "archived": p.archived,
          })
        })
        .collect();
      Value::Array(rows)
    }
  };
  app_state.cache.set(PRODUCTS_EXPORT_KEY, &products_data, EXPORT_TTL_SECS)?;
  Ok(HttpResponse::Ok().json(json!({ "products": products_data })))
}

#[instrument(name = "handler::orders_export", skip_all, err(Display))]
pub async fn orders_export_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let orders = db::orders::list_all(&app_state.db_pool).await?;
  let rows: Vec<Value> = orders
    .iter()
    .map(|o| {
      json!({
        "pk": o.id,
        "delivery_address": o.delivery_address,
        "promocode": o.promocode,
        "created_by": o.user_id,
      })
    })
    .collect();
  Ok(HttpResponse::Ok().json(json!({ "orders": rows })))
}

/// Per-user orders export under the fixed key `user_orders`.
///
/// The key is shared by all users, and a miss stores the value read before
/// the fetch (always empty) instead of the fresh rows, so this path never
/// produces a cache hit. A hit only happens if something else writes the key.
#[instrument(name = "handler::user_orders_export", skip(app_state), err(Display))]
pub async fn user_orders_export_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let data_json: Option<Value> = app_state.cache.get(USER_ORDERS_KEY);
  if let Some(cached) = &data_json {
    debug!("User orders export served from cache.");
    return Ok(HttpResponse::Ok().json(json!({ "orders": cached })));
  }

  let user = db::users::get_by_id(&app_state.db_pool, path.into_inner()).await?;
  let orders = db::orders::list_for_user(&app_state.db_pool, user.id).await?;
  let user_orders: Vec<Value> = orders
    .iter()
    .map(|o| {
      json!({
        "pk": o.id,
        "delivery_address": o.delivery_address,
        "promocode": o.promocode,
      })
    })
    .collect();
  app_state.cache.set(USER_ORDERS_KEY, &data_json, EXPORT_TTL_SECS)?;
  Ok(HttpResponse::Ok().json(json!({ "orders": user_orders })))
}
