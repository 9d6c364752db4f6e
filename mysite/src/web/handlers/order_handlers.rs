// mysite/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use crate::auth::{CurrentUser, Permission};
use crate::db;
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::forms::OrderForm;
use crate::web::redirect;

const ORDER_FORM_FIELDS: [&str; 4] = ["user", "delivery_address", "promocode", "products"];

/// Staff see every active order; everyone else only their own.
#[instrument(name = "handler::orders_list", skip_all, err(Display))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  current: CurrentUser,
) -> Result<HttpResponse, AppError> {
  let identity = current.require_perm(Permission::ViewOrder)?;
  let owner = if identity.is_staff() || identity.is_superuser() { None } else { Some(identity.id()) };

  let mut orders = Vec::new();
  for order in db::orders::list_active(&app_state.db_pool, owner).await? {
    let products = db::orders::products_of(&app_state.db_pool, order.id).await?;
    orders.push(json!({ "order": order, "products": products }));
  }
  Ok(HttpResponse::Ok().json(json!({ "orders": orders })))
}

#[instrument(name = "handler::order_detail", skip(app_state, current), err(Display))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  current: CurrentUser,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let identity = current.require_perm(Permission::ViewOrder)?;
  let order = db::orders::get_by_id(&app_state.db_pool, path.into_inner()).await?;
  if !(identity.is_staff() || identity.is_superuser() || order.user_id == identity.id()) {
    return Err(AppError::Forbidden("You cannot view this order.".to_string()));
  }

  let owner = db::users::get_by_id(&app_state.db_pool, order.user_id).await?;
  let products = db::orders::products_of(&app_state.db_pool, order.id).await?;
  Ok(HttpResponse::Ok().json(json!({
    "order": order,
    "user": { "pk": owner.id, "username": owner.username },
    "products": products,
  })))
}

pub async fn create_order_form_handler(current: CurrentUser) -> Result<HttpResponse, AppError> {
  current.require_perm(Permission::AddOrder)?;
  Ok(HttpResponse::Ok().json(json!({ "form": { "fields": ORDER_FORM_FIELDS } })))
}

#[instrument(name = "handler::order_create", skip_all, err(Display))]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  current: CurrentUser,
  form: web::Form<OrderForm>,
) -> Result<HttpResponse, AppError> {
  current.require_perm(Permission::AddOrder)?;
  let (fields, product_ids) = form.into_inner().into_fields()?;

  let mut tx = app_state.db_pool.begin().await?;
  let order = db::orders::insert(&mut *tx, &fields).await?;
  db::orders::set_products(&mut *tx, order.id, &product_ids).await?;
  tx.commit().await?;

  info!(order_id = order.id, products = product_ids.len(), "Order created.");
  Ok(redirect("/orders/"))
}

pub async fn update_order_form_handler(
  app_state: web::Data<AppState>,
  current: CurrentUser,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  current.require_perm(Permission::ChangeOrder)?;
  let order = db::orders::get_by_id(&app_state.db_pool, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({
    "form": { "fields": ["user", "delivery_address", "promocode"] },
    "order": order,
  })))
}

/// Edits owner, address and promocode; the product set is left alone.
#[instrument(name = "handler::order_update", skip(app_state, current, form), err(Display))]
pub async fn update_order_handler(
  app_state: web::Data<AppState>,
  current: CurrentUser,
  path: web::Path<i64>,
  form: web::Form<OrderForm>,
) -> Result<HttpResponse, AppError> {
  current.require_perm(Permission::ChangeOrder)?;
  let order_id = path.into_inner();
  let (fields, _) = form.into_inner().into_fields()?;
  db::orders::update(&app_state.db_pool, order_id, &fields).await?;
  info!(order_id, "Order updated.");
  Ok(redirect("/orders/"))
}

pub async fn archive_order_form_handler(
  app_state: web::Data<AppState>,
  current: CurrentUser,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  current.require_perm(Permission::DeleteOrder)?;
  let order = db::orders::get_by_id(&app_state.db_pool, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "order": order })))
}

#[instrument(name = "handler::order_archive", skip(app_state, current), err(Display))]
pub async fn archive_order_handler(
  app_state: web::Data<AppState>,
  current: CurrentUser,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  current.require_perm(Permission::DeleteOrder)?;
  let order_id = path.into_inner();
  db::orders::set_archived(&app_state.db_pool, order_id, true).await?;
  info!(order_id, "Order archived.");
  Ok(redirect(&format!("/orders/{}/", order_id)))
}

/// Orders of one user, archived ones included.
#[instrument(name = "handler::user_orders", skip(app_state), err(Display))]
pub async fn user_orders_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let owner = db::users::get_by_id(&app_state.db_pool, path.into_inner()).await?;
  let orders = db::orders::list_for_user(&app_state.db_pool, owner.id).await?;
  Ok(HttpResponse::Ok().json(json!({
    "owner": owner,
    "user_orders": orders,
  })))
}
