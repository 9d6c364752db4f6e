// mysite/src/db/profiles.rs

use crate::errors::Result;
use crate::models::Profile;
use sqlx::{SqliteExecutor, SqlitePool};

pub async fn insert_empty(executor: impl SqliteExecutor<'_>, user_id: i64) -> Result<Profile> {
  let profile = sqlx::query_as::<_, Profile>(
    "INSERT INTO profiles (user_id, bio, avatar) VALUES (?, '', NULL) RETURNING id, user_id, bio, avatar",
  )
  .bind(user_id)
  .fetch_one(executor)
  .await?;
  Ok(profile)
}

pub async fn find_by_id(pool: &SqlitePool, profile_id: i64) -> Result<Option<Profile>> {
  let profile = sqlx::query_as::<_, Profile>("SELECT id, user_id, bio, avatar FROM profiles WHERE id = ?")
    .bind(profile_id)
    .fetch_optional(pool)
    .await?;
  Ok(profile)
}

pub async fn find_by_user(pool: &SqlitePool, user_id: i64) -> Result<Option<Profile>> {
  let profile = sqlx::query_as::<_, Profile>("SELECT id, user_id, bio, avatar FROM profiles WHERE user_id = ?")
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
  Ok(profile)
}

pub async fn count_for_user(pool: &SqlitePool, user_id: i64) -> Result<i64> {
  let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM profiles WHERE user_id = ?")
    .bind(user_id)
    .fetch_one(pool)
    .await?;
  Ok(count)
}

pub async fn update_bio(pool: &SqlitePool, profile_id: i64, bio: &str) -> Result<()> {
  sqlx::query("UPDATE profiles SET bio = ? WHERE id = ?")
    .bind(bio)
    .bind(profile_id)
    .execute(pool)
    .await?;
  Ok(())
}

pub async fn set_avatar(pool: &SqlitePool, profile_id: i64, avatar: &str) -> Result<()> {
  sqlx::query("UPDATE profiles SET avatar = ? WHERE id = ?")
    .bind(avatar)
    .bind(profile_id)
    .execute(pool)
    .await?;
  Ok(())
}
