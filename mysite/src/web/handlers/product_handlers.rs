// mysite/src/web/handlers/product_handlers.rs

//! Product pages. Every mutation answers a redirect.

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use crate::auth::{CurrentUser, Permission};
use crate::db;
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::forms::ProductForm;
use crate::web::redirect;

const PRODUCT_FORM_FIELDS: [&str; 5] = ["name", "price", "description", "discount", "preview"];

#[instrument(name = "handler::products_list", skip_all, err(Display))]
pub async fn list_products_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let products = db::products::list_active(&app_state.db_pool).await?;
  Ok(HttpResponse::Ok().json(json!({ "products": products })))
}

/// Archived products still have a detail page.
#[instrument(name = "handler::product_detail", skip(app_state), err(Display))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let product = db::products::get_by_id(&app_state.db_pool, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "product": product })))
}

pub async fn create_product_form_handler(current: CurrentUser) -> Result<HttpResponse, AppError> {
  current.require_perm(Permission::AddProduct)?;
  Ok(HttpResponse::Ok().json(json!({ "form": { "fields": PRODUCT_FORM_FIELDS } })))
}

#[instrument(name = "handler::product_create", skip_all, err(Display))]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  current: CurrentUser,
  form: web::Form<ProductForm>,
) -> Result<HttpResponse, AppError> {
  let identity = current.require_perm(Permission::AddProduct)?;
  let fields = form.into_inner().into_fields()?;
  let product = db::products::insert(&app_state.db_pool, &fields, identity.id()).await?;
  info!(product_id = product.id, user_id = identity.id(), "Product created.");
  Ok(redirect("/products/"))
}

pub async fn update_product_form_handler(
  app_state: web::Data<AppState>,
  current: CurrentUser,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let identity = current.require_login()?;
  let product = db::products::get_by_id(&app_state.db_pool, path.into_inner()).await?;
  if !identity.can_edit_product(&product) {
    return Err(AppError::Forbidden("You cannot edit this product.".to_string()));
  }
  Ok(HttpResponse::Ok().json(json!({
    "form": { "fields": PRODUCT_FORM_FIELDS },
    "product": product,
  })))
}

#[instrument(name = "handler::product_update", skip(app_state, current, form), err(Display))]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  current: CurrentUser,
  path: web::Path<i64>,
  form: web::Form<ProductForm>,
) -> Result<HttpResponse, AppError> {
  let identity = current.require_login()?;
  let product = db::products::get_by_id(&app_state.db_pool, path.into_inner()).await?;
  if !identity.can_edit_product(&product) {
    return Err(AppError::Forbidden("You cannot edit this product.".to_string()));
  }
  let fields = form.into_inner().into_fields()?;
  let updated = db::products::update(&app_state.db_pool, product.id, &fields).await?;
  info!(product_id = updated.id, "Product updated.");
  Ok(redirect(&format!("/products/{}/", updated.id)))
}

pub async fn archive_product_form_handler(
  app_state: web::Data<AppState>,
  current: CurrentUser,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  current.require_perm(Permission::DeleteProduct)?;
  let product = db::products::get_by_id(&app_state.db_pool, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "product": product })))
}

/// Soft delete: sets `archived` and redirects to the product's own page.
#[instrument(name = "handler::product_archive", skip(app_state, current), err(Display))]
pub async fn archive_product_handler(
  app_state: web::Data<AppState>,
  current: CurrentUser,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  current.require_perm(Permission::DeleteProduct)?;
  let product_id = path.into_inner();
  db::products::set_archived(&app_state.db_pool, product_id, true).await?;
  info!(product_id, "Product archived.");
  Ok(redirect(&format!("/products/{}/", product_id)))
}
