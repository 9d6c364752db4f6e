// mysite/src/services/admin_commands.rs

//! Administrative actions behind the `mysite_admin` binary.

use crate::auth::Permission;
use crate::db;
use crate::db::products::ProductFields;
use crate::db::users::NewUser;
use crate::errors::{AppError, Result};
use crate::models::{Article, Author, Category, Order, Product, Tag, User};
use crate::pipelines::contexts::{CsvImportCtxData, OrderBundleCtxData};
use crate::services::{auth_service, product_csv};
use crate::state::AppState;
use chrono::NaiveDate;
use flow::{ContextData, PipelineResult};
use tracing::{info, instrument};

pub const BUNDLE_DELIVERY_ADDRESS: &str = "Ivanov st-t, 8";
pub const BUNDLE_PROMOCODE: &str = "promo6";

/// Demo catalogue created by `bulk-create-products`: name and whole price.
pub const DEMO_SMARTPHONES: [(&str, i64); 3] = [("Smartphone 1", 199), ("Smartphone 2", 299), ("Smartphone 3", 399)];

async fn user_by_name(state: &AppState, username: &str) -> Result<User> {
  db::users::find_by_username(&state.db_pool, username)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User '{}' not found.", username)))
}

#[instrument(name = "admin::create_superuser", skip(state, password), err(Display))]
pub async fn create_superuser(state: &AppState, username: &str, email: &str, password: &str) -> Result<User> {
  if let Some(problem) = auth_service::username_problem(username) {
    return Err(AppError::Validation(problem));
  }
  if db::users::username_exists(&state.db_pool, username).await? {
    return Err(AppError::Conflict(format!("User '{}' already exists.", username)));
  }
  let new_user = NewUser {
    username: username.to_string(),
    password_hash: auth_service::hash_password(password)?,
    email: email.to_string(),
    is_staff: true,
    is_superuser: true,
    ..NewUser::default()
  };
  let user = db::users::insert(&state.db_pool, &new_user).await?;
  db::profiles::insert_empty(&state.db_pool, user.id).await?;
  info!(user_id = user.id, "Superuser created.");
  Ok(user)
}

pub async fn grant_permission(state: &AppState, username: &str, permission: Permission) -> Result<()> {
  let user = user_by_name(state, username).await?;
  db::users::grant_permission(&state.db_pool, user.id, permission.codename()).await?;
  info!(user_id = user.id, %permission, "Permission granted.");
  Ok(())
}

/// Grants `permission` to the named group, creating the group if needed.
pub async fn grant_group_permission(state: &AppState, group_name: &str, permission: Permission) -> Result<i64> {
  let existing = db::groups::list(&state.db_pool).await?.into_iter().find(|g| g.name == group_name);
  let group = match existing {
    Some(group) => group,
    None => db::groups::insert(&state.db_pool, group_name).await?,
  };
  db::groups::grant_permission(&state.db_pool, group.id, permission.codename()).await?;
  Ok(group.id)
}

pub async fn add_to_group(state: &AppState, username: &str, group_name: &str) -> Result<()> {
  let user = user_by_name(state, username).await?;
  let group = db::groups::list(&state.db_pool)
    .await?
    .into_iter()
    .find(|g| g.name == group_name)
    .ok_or_else(|| AppError::NotFound(format!("Group '{}' not found.", group_name)))?;
  db::groups::add_member(&state.db_pool, group.id, user.id).await
}

/// Get-or-create the bundle order for `username` and attach every product.
/// Returns the order and whether it was newly created.
#[instrument(name = "admin::create_order", skip(state), err(Display))]
pub async fn create_order(state: &AppState, username: &str) -> Result<(Order, bool)> {
  let ctx_data = ContextData::new(OrderBundleCtxData::new(
    state.clone(),
    username.to_string(),
    BUNDLE_DELIVERY_ADDRESS.to_string(),
    BUNDLE_PROMOCODE.to_string(),
  ));

  match state.flows.run(ctx_data.clone()).await? {
    PipelineResult::Completed => {
      let guard = ctx_data.read();
      let order = guard
        .order
        .clone()
        .ok_or_else(|| AppError::Internal("Order bundle completed without an order.".to_string()))?;
      Ok((order, guard.order_created))
    }
    PipelineResult::Stopped => Err(AppError::PipelineHaltedByHandler),
  }
}

pub async fn bulk_discount(state: &AppState, name_contains: &str, discount: i32) -> Result<u64> {
  let updated = db::products::set_discount_where_name_contains(&state.db_pool, name_contains, discount).await?;
  info!(name_contains, discount, updated, "Bulk discount applied.");
  Ok(updated)
}

/// Creates the demo smartphones in one transaction, owned by `username`.
pub async fn bulk_create_products(state: &AppState, username: &str) -> Result<Vec<Product>> {
  let owner = user_by_name(state, username).await?;
  let mut tx = state.db_pool.begin().await?;
  let mut created = Vec::with_capacity(DEMO_SMARTPHONES.len());
  for (name, price) in DEMO_SMARTPHONES {
    let fields = ProductFields {
      name: name.to_string(),
      price_cents: price * 100,
      ..ProductFields::default()
    };
    created.push(db::products::insert(&mut *tx, &fields, owner.id).await?);
  }
  tx.commit().await?;
  Ok(created)
}

pub async fn set_products_archived(state: &AppState, product_ids: &[i64], archived: bool) -> Result<u64> {
  db::products::set_archived_many(&state.db_pool, product_ids, archived).await
}

/// All products as CSV, in ascending id order.
pub async fn export_products_csv(state: &AppState) -> Result<Vec<u8>> {
  let products = db::products::list_all(&state.db_pool).await?;
  product_csv::export_products(&products)
}

pub async fn import_products_csv(state: &AppState, username: &str, data: Vec<u8>) -> Result<Vec<Product>> {
  let owner = user_by_name(state, username).await?;
  let ctx_data = ContextData::new(CsvImportCtxData::new(state.clone(), owner.id, data));
  match state.flows.run(ctx_data.clone()).await? {
    PipelineResult::Completed => Ok(ctx_data.read().created_products.clone()),
    PipelineResult::Stopped => Err(AppError::PipelineHaltedByHandler),
  }
}

/// Deletes a user; fails with `Conflict` while any order references them.
pub async fn delete_user(state: &AppState, username: &str) -> Result<()> {
  let user = user_by_name(state, username).await?;
  db::users::delete(&state.db_pool, user.id).await
}

pub async fn add_article(state: &AppState, title: &str, body: Option<&str>, pub_date: Option<NaiveDate>) -> Result<Article> {
  db::articles::insert(&state.db_pool, title, body, pub_date).await
}

pub async fn add_author(state: &AppState, name: &str, bio: Option<&str>) -> Result<Author> {
  db::articles::insert_author(&state.db_pool, name, bio).await
}

pub async fn add_category(state: &AppState, name: &str) -> Result<Category> {
  if name.is_empty() || name.chars().count() > 40 {
    return Err(AppError::Validation("Category name must have 1 to 40 characters.".to_string()));
  }
  db::articles::insert_category(&state.db_pool, name).await
}

pub async fn add_tag(state: &AppState, name: &str) -> Result<Tag> {
  if name.is_empty() || name.chars().count() > 20 {
    return Err(AppError::Validation("Tag name must have 1 to 20 characters.".to_string()));
  }
  db::articles::insert_tag(&state.db_pool, name).await
}

/// Demo content for `SEED_DB=true`: the smartphones, owned by the first
/// superuser. Skipped when there is no superuser or products already exist.
pub async fn seed_demo_data(state: &AppState) -> Result<()> {
  let Some(owner) = db::users::list(&state.db_pool).await?.into_iter().find(|u| u.is_superuser) else {
    tracing::warn!("SEED_DB is set but no superuser exists; create one with `mysite_admin create-superuser`.");
    return Ok(());
  };
  if !db::products::list_all(&state.db_pool).await?.is_empty() {
    info!("Products already present, skipping seed.");
    return Ok(());
  }
  let created = bulk_create_products(state, &owner.username).await?;
  info!(count = created.len(), "Demo products seeded.");
  Ok(())
}
