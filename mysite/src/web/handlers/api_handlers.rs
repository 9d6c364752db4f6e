// mysite/src/web/handlers/api_handlers.rs

//! JSON API for products and orders. Reads are public; writes need an
//! authenticated session and answer 403 otherwise.

use actix_multipart::Multipart;
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use tracing::{debug, info, instrument, warn};
use validator::ValidationErrors;

use crate::auth::CurrentUser;
use crate::db;
use crate::db::orders::{OrderFields, OrderQuery};
use crate::db::products::{ProductFields, ProductQuery};
use crate::errors::{push_field_error, AppError};
use crate::models::order::OrderWithProducts;
use crate::models::product::price_to_cents;
use crate::models::Order;
use crate::pipelines::contexts::CsvImportCtxData;
use crate::services::{product_csv, uploads};
use crate::state::AppState;
use flow::{ContextData, PipelineResult};

pub const CSV_UPLOAD_FIELD: &str = "file";
const API_PRODUCTS_CACHE_PREFIX: &str = "api_products";
const API_PRODUCTS_TTL_SECS: u64 = 120;
const PRODUCT_NAME_MAX_LEN: usize = 100;
const PROMOCODE_MAX_LEN: usize = 20;

// ---- Query parameters ----

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProductListParams {
  pub search: Option<String>,
  pub name: Option<String>,
  pub description: Option<String>,
  pub price: Option<String>,
  pub discount: Option<String>,
  pub archived: Option<String>,
  pub ordering: Option<String>,
}

fn parse_bool(field: &str, raw: &str) -> Result<bool, AppError> {
  match raw.trim().to_ascii_lowercase().as_str() {
    "true" | "1" => Ok(true),
    "false" | "0" => Ok(false),
    _ => Err(AppError::Validation(format!("'{}' must be true or false.", field))),
  }
}

impl ProductListParams {
  pub fn into_query(self) -> Result<ProductQuery, AppError> {
    let price_cents = match self.price.as_deref() {
      None => None,
      Some(raw) => Some(
        Decimal::from_str(raw.trim())
          .ok()
          .and_then(price_to_cents)
          .ok_or_else(|| AppError::Validation("'price' must be a valid price.".to_string()))?,
      ),
    };
    let discount = match self.discount.as_deref() {
      None => None,
      Some(raw) => Some(
        raw
          .trim()
          .parse::<i32>()
          .map_err(|_| AppError::Validation("'discount' must be a whole number.".to_string()))?,
      ),
    };
    let archived = self.archived.as_deref().map(|raw| parse_bool("archived", raw)).transpose()?;

    Ok(ProductQuery {
      search: self.search,
      name: self.name,
      description: self.description,
      price_cents,
      discount,
      archived,
      ordering: self.ordering,
    })
  }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OrderListParams {
  pub search: Option<String>,
  pub delivery_address: Option<String>,
  pub promocode: Option<String>,
  pub user: Option<String>,
  pub ordering: Option<String>,
}

impl OrderListParams {
  pub fn into_query(self) -> Result<OrderQuery, AppError> {
    let user_id = self
      .user
      .as_deref()
      .map(|raw| raw.trim().parse::<i64>())
      .transpose()
      .map_err(|_| AppError::Validation("'user' must be a user id.".to_string()))?;
    Ok(OrderQuery {
      search: self.search,
      delivery_address: self.delivery_address,
      promocode: self.promocode,
      user_id,
      ordering: self.ordering,
    })
  }
}

// ---- Payloads ----

/// Product write payload. On update, absent fields keep their current value.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProductPayload {
  pub name: Option<String>,
  pub description: Option<String>,
  pub price: Option<Decimal>,
  pub discount: Option<i32>,
  pub preview: Option<String>,
}

impl ProductPayload {
  fn merge_into(self, base: ProductFields) -> Result<ProductFields, AppError> {
    let mut errors = ValidationErrors::new();

    let name = self.name.map(|n| n.trim().to_string()).unwrap_or(base.name);
    if name.is_empty() || name.chars().count() > PRODUCT_NAME_MAX_LEN {
      push_field_error(&mut errors, "name", "length", "Ensure this value has 1 to 100 characters.");
    }

    let price_cents = match self.price {
      None => base.price_cents,
      Some(price) => price_to_cents(price).unwrap_or_else(|| {
        push_field_error(
          &mut errors,
          "price",
          "invalid",
          "Ensure the price is positive with at most 8 digits and 2 decimal places.",
        );
        0
      }),
    };

    let discount = self.discount.unwrap_or(base.discount);
    if i16::try_from(discount).is_err() {
      push_field_error(&mut errors, "discount", "invalid", "Ensure this value fits a small integer.");
    }

    if !errors.is_empty() {
      return Err(AppError::Form(errors));
    }
    Ok(ProductFields {
      name,
      description: self.description.unwrap_or(base.description),
      price_cents,
      discount,
      preview: self.preview.or(base.preview),
    })
  }

  fn into_new_fields(self) -> Result<ProductFields, AppError> {
    let mut errors = ValidationErrors::new();
    if self.name.is_none() {
      push_field_error(&mut errors, "name", "required", "This field is required.");
    }
    if self.price.is_none() {
      push_field_error(&mut errors, "price", "required", "This field is required.");
    }
    if !errors.is_empty() {
      return Err(AppError::Form(errors));
    }
    self.merge_into(ProductFields::default())
  }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OrderPayload {
  pub user: Option<i64>,
  pub delivery_address: Option<String>,
  pub promocode: Option<String>,
  pub products: Option<Vec<i64>>,
}

impl OrderPayload {
  fn merge_into(self, base: OrderFields) -> Result<(OrderFields, Option<Vec<i64>>), AppError> {
    let promocode = self.promocode.map(|p| p.trim().to_string()).unwrap_or(base.promocode);
    if promocode.chars().count() > PROMOCODE_MAX_LEN {
      let mut errors = ValidationErrors::new();
      push_field_error(&mut errors, "promocode", "length", "Ensure this value has at most 20 characters.");
      return Err(AppError::Form(errors));
    }
    let fields = OrderFields {
      user_id: self.user.unwrap_or(base.user_id),
      delivery_address: self.delivery_address.or(base.delivery_address),
      promocode,
    };
    Ok((fields, self.products))
  }

  fn into_new_fields(self) -> Result<(OrderFields, Option<Vec<i64>>), AppError> {
    if self.user.is_none() {
      let mut errors = ValidationErrors::new();
      push_field_error(&mut errors, "user", "required", "This field is required.");
      return Err(AppError::Form(errors));
    }
    self.merge_into(OrderFields::default())
  }
}

fn order_fields(order: &Order) -> OrderFields {
  OrderFields {
    user_id: order.user_id,
    delivery_address: order.delivery_address.clone(),
    promocode: order.promocode.clone(),
  }
}

async fn with_products(app_state: &AppState, order: Order) -> Result<OrderWithProducts, AppError> {
  let products = db::orders::product_ids(&app_state.db_pool, order.id).await?;
  Ok(OrderWithProducts { order, products })
}

// ---- Products ----

/// Filtered, searched and ordered product list, cached per query string.
#[instrument(name = "api::products_list", skip(app_state, req, params), err(Display))]
pub async fn api_products_list_handler(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  params: web::Query<ProductListParams>,
) -> Result<HttpResponse, AppError> {
  let cache_key = format!("{}:{}", API_PRODUCTS_CACHE_PREFIX, req.query_string());
  if let Some(cached) = app_state.cache.get::<Value>(&cache_key) {
    debug!(%cache_key, "API products list served from cache.");
    return Ok(HttpResponse::Ok().json(cached));
  }

  let query = params.into_inner().into_query()?;
  let products = db::products::query(&app_state.db_pool, &query).await?;
  let body = serde_json::to_value(&products)
    .map_err(|e| AppError::Internal(format!("Failed to serialize products: {}", e)))?;
  app_state.cache.set(&cache_key, &body, API_PRODUCTS_TTL_SECS)?;
  Ok(HttpResponse::Ok().json(body))
}

#[instrument(name = "api::products_create", skip(app_state, current, payload), err(Display))]
pub async fn api_products_create_handler(
  app_state: web::Data<AppState>,
  current: CurrentUser,
  payload: web::Json<ProductPayload>,
) -> Result<HttpResponse, AppError> {
  let identity = current.require_api_auth()?;
  let fields = payload.into_inner().into_new_fields()?;
  let product = db::products::insert(&app_state.db_pool, &fields, identity.id()).await?;
  info!(product_id = product.id, "Product created through the API.");
  Ok(HttpResponse::Created().json(product))
}

pub async fn api_products_retrieve_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let product = db::products::get_by_id(&app_state.db_pool, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(product))
}

/// Serves both PUT and PATCH; fields missing from the body are kept.
#[instrument(name = "api::products_update", skip(app_state, current, payload), err(Display))]
pub async fn api_products_update_handler(
  app_state: web::Data<AppState>,
  current: CurrentUser,
  path: web::Path<i64>,
  payload: web::Json<ProductPayload>,
) -> Result<HttpResponse, AppError> {
  current.require_api_auth()?;
  let existing = db::products::get_by_id(&app_state.db_pool, path.into_inner()).await?;
  let base = ProductFields {
    name: existing.name,
    description: existing.description,
    price_cents: price_to_cents(existing.price).unwrap_or_default(),
    discount: existing.discount,
    preview: existing.preview,
  };
  let fields = payload.into_inner().merge_into(base)?;
  let product = db::products::update(&app_state.db_pool, existing.id, &fields).await?;
  Ok(HttpResponse::Ok().json(product))
}

/// Archives instead of deleting.
#[instrument(name = "api::products_delete", skip(app_state, current), err(Display))]
pub async fn api_products_delete_handler(
  app_state: web::Data<AppState>,
  current: CurrentUser,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  current.require_api_auth()?;
  let product_id = path.into_inner();
  db::products::set_archived(&app_state.db_pool, product_id, true).await?;
  info!(product_id, "Product archived through the API.");
  Ok(HttpResponse::NoContent().finish())
}

/// The filtered product list as a CSV attachment.
#[instrument(name = "api::products_download_csv", skip(app_state, params), err(Display))]
pub async fn api_products_download_csv_handler(
  app_state: web::Data<AppState>,
  params: web::Query<ProductListParams>,
) -> Result<HttpResponse, AppError> {
  let query = params.into_inner().into_query()?;
  let products = db::products::query(&app_state.db_pool, &query).await?;
  let body = product_csv::export_products(&products)?;
  Ok(
    HttpResponse::Ok()
      .content_type("text/csv")
      .insert_header((
        header::CONTENT_DISPOSITION,
        format!("attachment; filename={}", product_csv::EXPORT_FILENAME),
      ))
      .body(body),
  )
}

/// Imports products from the multipart `file` field, owned by the caller.
#[instrument(name = "api::products_upload_csv", skip_all, err(Display))]
pub async fn api_products_upload_csv_handler(
  app_state: web::Data<AppState>,
  current: CurrentUser,
  payload: Multipart,
) -> Result<HttpResponse, AppError> {
  let owner_id = current.require_api_auth()?.id();
  let upload = uploads::read_file(payload, CSV_UPLOAD_FIELD).await?;

  let ctx_data = ContextData::new(CsvImportCtxData::new(app_state.get_ref().clone(), owner_id, upload.data));
  match app_state.flows.run(ctx_data.clone()).await {
    Ok(PipelineResult::Completed) => {
      let created = ctx_data.read().created_products.clone();
      Ok(HttpResponse::Ok().json(created))
    }
    Ok(PipelineResult::Stopped) => {
      warn!("CSV import pipeline was stopped by a handler.");
      Err(AppError::PipelineHaltedByHandler)
    }
    Err(app_err) => {
      warn!("CSV import failed: {}", app_err);
      Err(app_err)
    }
  }
}

// ---- Orders ----

#[instrument(name = "api::orders_list", skip(app_state, params), err(Display))]
pub async fn api_orders_list_handler(
  app_state: web::Data<AppState>,
  params: web::Query<OrderListParams>,
) -> Result<HttpResponse, AppError> {
  let query = params.into_inner().into_query()?;
  let orders = db::orders::query(&app_state.db_pool, &query).await?;
  let mut body = Vec::with_capacity(orders.len());
  for order in orders {
    body.push(with_products(&app_state, order).await?);
  }
  Ok(HttpResponse::Ok().json(body))
}

#[instrument(name = "api::orders_create", skip(app_state, current, payload), err(Display))]
pub async fn api_orders_create_handler(
  app_state: web::Data<AppState>,
  current: CurrentUser,
  payload: web::Json<OrderPayload>,
) -> Result<HttpResponse, AppError> {
  current.require_api_auth()?;
  let (fields, product_ids) = payload.into_inner().into_new_fields()?;

  let mut tx = app_state.db_pool.begin().await?;
  let order = db::orders::insert(&mut *tx, &fields).await?;
  db::orders::set_products(&mut *tx, order.id, &product_ids.unwrap_or_default()).await?;
  tx.commit().await?;

  info!(order_id = order.id, "Order created through the API.");
  Ok(HttpResponse::Created().json(with_products(&app_state, order).await?))
}

pub async fn api_orders_retrieve_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let order = db::orders::get_by_id(&app_state.db_pool, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(with_products(&app_state, order).await?))
}

/// PUT and PATCH. `products`, when present, replaces the product set.
#[instrument(name = "api::orders_update", skip(app_state, current, payload), err(Display))]
pub async fn api_orders_update_handler(
  app_state: web::Data<AppState>,
  current: CurrentUser,
  path: web::Path<i64>,
  payload: web::Json<OrderPayload>,
) -> Result<HttpResponse, AppError> {
  current.require_api_auth()?;
  let existing = db::orders::get_by_id(&app_state.db_pool, path.into_inner()).await?;
  let (fields, product_ids) = payload.into_inner().merge_into(order_fields(&existing))?;

  let mut tx = app_state.db_pool.begin().await?;
  let order = db::orders::update(&mut *tx, existing.id, &fields).await?;
  if let Some(product_ids) = product_ids {
    db::orders::set_products(&mut *tx, order.id, &product_ids).await?;
  }
  tx.commit().await?;
  Ok(HttpResponse::Ok().json(with_products(&app_state, order).await?))
}

#[instrument(name = "api::orders_delete", skip(app_state, current), err(Display))]
pub async fn api_orders_delete_handler(
  app_state: web::Data<AppState>,
  current: CurrentUser,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  current.require_api_auth()?;
  let order_id = path.into_inner();
  db::orders::set_archived(&app_state.db_pool, order_id, true).await?;
  info!(order_id, "Order archived through the API.");
  Ok(HttpResponse::NoContent().finish())
}
