// mysite/src/db/users.rs

use crate::errors::{AppError, Result};
use crate::models::User;
use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use std::collections::HashSet;
use tracing::instrument;

const USER_COLUMNS: &str =
  "id, username, password_hash, first_name, last_name, email, is_staff, is_superuser, is_active, date_joined";

/// Fields for a new account. The password is already hashed.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
  pub username: String,
  pub password_hash: String,
  pub first_name: String,
  pub last_name: String,
  pub email: String,
  pub is_staff: bool,
  pub is_superuser: bool,
}

#[instrument(name = "db::users::insert", skip(executor, new_user), fields(username = %new_user.username), err(Display))]
pub async fn insert(executor: impl SqliteExecutor<'_>, new_user: &NewUser) -> Result<User> {
  let sql = format!(
    "INSERT INTO users (username, password_hash, first_name, last_name, email, is_staff, is_superuser, is_active, date_joined) \
     VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?) RETURNING {}",
    USER_COLUMNS
  );
  let user = sqlx::query_as::<_, User>(&sql)
    .bind(&new_user.username)
    .bind(&new_user.password_hash)
    .bind(&new_user.first_name)
    .bind(&new_user.last_name)
    .bind(&new_user.email)
    .bind(new_user.is_staff)
    .bind(new_user.is_superuser)
    .bind(Utc::now())
    .fetch_one(executor)
    .await?;
  Ok(user)
}

pub async fn find_by_id(pool: &SqlitePool, user_id: i64) -> Result<Option<User>> {
  let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
  Ok(sqlx::query_as::<_, User>(&sql).bind(user_id).fetch_optional(pool).await?)
}

/// Like `find_by_id`, but a missing user is `NotFound`.
pub async fn get_by_id(pool: &SqlitePool, user_id: i64) -> Result<User> {
  find_by_id(pool, user_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User {} not found.", user_id)))
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
  let sql = format!("SELECT {} FROM users WHERE username = ?", USER_COLUMNS);
  Ok(sqlx::query_as::<_, User>(&sql).bind(username).fetch_optional(pool).await?)
}

pub async fn username_exists(pool: &SqlitePool, username: &str) -> Result<bool> {
  let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)")
    .bind(username)
    .fetch_one(pool)
    .await?;
  Ok(exists)
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<User>> {
  let sql = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
  Ok(sqlx::query_as::<_, User>(&sql).fetch_all(pool).await?)
}

/// Deletes a user together with their products, profile and sessions.
/// Orders reference users with RESTRICT, so a user who still owns orders
/// cannot be deleted and this returns `Conflict`.
#[instrument(name = "db::users::delete", skip(pool), err(Display))]
pub async fn delete(pool: &SqlitePool, user_id: i64) -> Result<()> {
  let result = sqlx::query("DELETE FROM users WHERE id = ?")
    .bind(user_id)
    .execute(pool)
    .await
    .map_err(|e| AppError::from_constraint(e, "User still owns orders and cannot be deleted."))?;
  if result.rows_affected() == 0 {
    return Err(AppError::NotFound(format!("User {} not found.", user_id)));
  }
  Ok(())
}

/// Codenames granted to the user directly or through any of their groups.
pub async fn permission_codenames(pool: &SqlitePool, user_id: i64) -> Result<HashSet<String>> {
  let codenames = sqlx::query_scalar::<_, String>(
    "SELECT codename FROM user_permissions WHERE user_id = ? \
     UNION \
     SELECT gp.codename FROM group_permissions gp \
     JOIN user_groups ug ON ug.group_id = gp.group_id \
     WHERE ug.user_id = ?",
  )
  .bind(user_id)
  .bind(user_id)
  .fetch_all(pool)
  .await?;
  Ok(codenames.into_iter().collect())
}

pub async fn grant_permission(pool: &SqlitePool, user_id: i64, codename: &str) -> Result<()> {
  sqlx::query("INSERT OR IGNORE INTO user_permissions (user_id, codename) VALUES (?, ?)")
    .bind(user_id)
    .bind(codename)
    .execute(pool)
    .await?;
  Ok(())
}

pub async fn set_staff(pool: &SqlitePool, user_id: i64, is_staff: bool) -> Result<()> {
  sqlx::query("UPDATE users SET is_staff = ? WHERE id = ?")
    .bind(is_staff)
    .bind(user_id)
    .execute(pool)
    .await?;
  Ok(())
}
