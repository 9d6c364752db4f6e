// mysite/src/web/handlers/shop_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{debug, info, instrument};

use crate::auth::CurrentUser;
use crate::db;
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::forms::GroupForm;
use crate::web::redirect;

/// Fixed showcase shown on the shop index: name and price.
const SHOWCASE: [(&str, i64); 3] = [("Laptop", 1999), ("Desktop", 2999), ("Smartphone", 999)];

pub async fn main_index_handler() -> HttpResponse {
  HttpResponse::Ok().json(json!({
    "title": "mysite",
    "sections": {
      "shop": "/shop/",
      "products": "/products/",
      "orders": "/orders/",
      "blog": "/blog/",
      "about_me": "/about-me/",
      "request_data": "/req/get/",
    },
  }))
}

#[instrument(name = "handler::shop_index", skip_all)]
pub async fn shop_index_handler(app_state: web::Data<AppState>) -> HttpResponse {
  let products: Vec<_> = SHOWCASE.iter().map(|(name, price)| json!([name, price])).collect();
  debug!(?products, "Products for shop index");
  info!("Rendering shop index");
  HttpResponse::Ok().json(json!({
    "time_running": app_state.started_at.elapsed().as_secs_f64(),
    "products": products,
    "items": 2,
  }))
}

#[instrument(name = "handler::groups_list", skip_all, err(Display))]
pub async fn groups_list_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let mut groups = Vec::new();
  for group in db::groups::list(&app_state.db_pool).await? {
    let permissions = db::groups::permissions_of(&app_state.db_pool, group.id).await?;
    groups.push(json!({
      "pk": group.id,
      "name": group.name,
      "permissions": permissions,
    }));
  }
  Ok(HttpResponse::Ok().json(json!({
    "form": { "fields": ["name"] },
    "groups": groups,
  })))
}

#[instrument(name = "handler::group_create", skip_all, err(Display))]
pub async fn group_create_handler(
  app_state: web::Data<AppState>,
  current: CurrentUser,
  form: web::Form<GroupForm>,
) -> Result<HttpResponse, AppError> {
  current.require_staff()?;
  let name = form.into_inner().into_name()?;
  let group = db::groups::insert(&app_state.db_pool, &name).await?;
  info!(group_id = group.id, "Group created.");
  Ok(redirect("/groups/"))
}
