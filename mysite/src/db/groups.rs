// mysite/src/db/groups.rs

use crate::errors::{AppError, Result};
use crate::models::Group;
use sqlx::SqlitePool;

pub async fn list(pool: &SqlitePool) -> Result<Vec<Group>> {
  Ok(sqlx::query_as::<_, Group>("SELECT id, name FROM auth_groups ORDER BY id").fetch_all(pool).await?)
}

pub async fn permissions_of(pool: &SqlitePool, group_id: i64) -> Result<Vec<String>> {
  let codenames = sqlx::query_scalar::<_, String>(
    "SELECT codename FROM group_permissions WHERE group_id = ? ORDER BY codename",
  )
  .bind(group_id)
  .fetch_all(pool)
  .await?;
  Ok(codenames)
}

pub async fn insert(pool: &SqlitePool, name: &str) -> Result<Group> {
  sqlx::query_as::<_, Group>("INSERT INTO auth_groups (name) VALUES (?) RETURNING id, name")
    .bind(name)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
      sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
        AppError::Conflict(format!("Group '{}' already exists.", name))
      }
      other => AppError::Sqlx(other),
    })
}

pub async fn grant_permission(pool: &SqlitePool, group_id: i64, codename: &str) -> Result<()> {
  sqlx::query("INSERT OR IGNORE INTO group_permissions (group_id, codename) VALUES (?, ?)")
    .bind(group_id)
    .bind(codename)
    .execute(pool)
    .await?;
  Ok(())
}

pub async fn add_member(pool: &SqlitePool, group_id: i64, user_id: i64) -> Result<()> {
  sqlx::query("INSERT OR IGNORE INTO user_groups (user_id, group_id) VALUES (?, ?)")
    .bind(user_id)
    .bind(group_id)
    .execute(pool)
    .await?;
  Ok(())
}
