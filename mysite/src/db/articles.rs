// mysite/src/db/articles.rs

use crate::errors::{AppError, Result};
use crate::models::{Article, Author, Category, Tag};
use chrono::NaiveDate;
use sqlx::SqlitePool;

/// Published articles, newest first. `limit` caps the count (the feed uses 5).
pub async fn list_published(pool: &SqlitePool, limit: Option<i64>) -> Result<Vec<Article>> {
  let articles = sqlx::query_as::<_, Article>(
    "SELECT id, title, body, pub_date FROM articles WHERE pub_date IS NOT NULL \
     ORDER BY pub_date DESC, id DESC LIMIT ?",
  )
  .bind(limit.unwrap_or(-1))
  .fetch_all(pool)
  .await?;
  Ok(articles)
}

pub async fn get_by_id(pool: &SqlitePool, article_id: i64) -> Result<Article> {
  sqlx::query_as::<_, Article>("SELECT id, title, body, pub_date FROM articles WHERE id = ?")
    .bind(article_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Article {} not found.", article_id)))
}

pub async fn insert(pool: &SqlitePool, title: &str, body: Option<&str>, pub_date: Option<NaiveDate>) -> Result<Article> {
  let article = sqlx::query_as::<_, Article>(
    "INSERT INTO articles (title, body, pub_date) VALUES (?, ?, ?) RETURNING id, title, body, pub_date",
  )
  .bind(title)
  .bind(body)
  .bind(pub_date)
  .fetch_one(pool)
  .await?;
  Ok(article)
}

pub async fn insert_author(pool: &SqlitePool, name: &str, bio: Option<&str>) -> Result<Author> {
  let author = sqlx::query_as::<_, Author>("INSERT INTO authors (name, bio) VALUES (?, ?) RETURNING id, name, bio")
    .bind(name)
    .bind(bio)
    .fetch_one(pool)
    .await?;
  Ok(author)
}

pub async fn insert_category(pool: &SqlitePool, name: &str) -> Result<Category> {
  let category = sqlx::query_as::<_, Category>("INSERT INTO categories (name) VALUES (?) RETURNING id, name")
    .bind(name)
    .fetch_one(pool)
    .await?;
  Ok(category)
}

pub async fn insert_tag(pool: &SqlitePool, name: &str) -> Result<Tag> {
  let tag = sqlx::query_as::<_, Tag>("INSERT INTO tags (name) VALUES (?) RETURNING id, name")
    .bind(name)
    .fetch_one(pool)
    .await?;
  Ok(tag)
}
