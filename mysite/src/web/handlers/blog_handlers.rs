// mysite/src/web/handlers/blog_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::instrument;

use crate::db;
use crate::errors::AppError;
use crate::services::feed;
use crate::state::AppState;

const RSS_CONTENT_TYPE: &str = "application/rss+xml; charset=utf-8";

#[instrument(name = "handler::blog_list", skip_all, err(Display))]
pub async fn blog_list_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let articles = db::articles::list_published(&app_state.db_pool, None).await?;
  Ok(HttpResponse::Ok().json(json!({ "articles": articles })))
}

#[instrument(name = "handler::blog_detail", skip(app_state), err(Display))]
pub async fn blog_detail_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let article = db::articles::get_by_id(&app_state.db_pool, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "article": article })))
}

#[instrument(name = "handler::latest_feed", skip_all, err(Display))]
pub async fn latest_feed_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let articles = db::articles::list_published(&app_state.db_pool, Some(feed::FEED_ITEM_LIMIT)).await?;
  let xml = feed::latest_articles_feed(&app_state.config.app_base_url, &articles);
  Ok(HttpResponse::Ok().content_type(RSS_CONTENT_TYPE).body(xml))
}
