// mysite/src/models/article.rs

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Author {
  #[serde(rename = "pk")]
  pub id: i64,
  pub name: String,
  pub bio: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
  #[serde(rename = "pk")]
  pub id: i64,
  pub name: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Tag {
  #[serde(rename = "pk")]
  pub id: i64,
  pub name: String,
}

/// Blog article. Articles without a `pub_date` are drafts: they never show
/// up in the blog list or the feed, only at their own URL.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Article {
  #[serde(rename = "pk")]
  pub id: i64,
  pub title: String,
  pub body: Option<String>,
  pub pub_date: Option<NaiveDate>,
}

impl Article {
  pub fn absolute_path(&self) -> String {
    format!("/blog/{}/", self.id)
  }

  /// First 200 characters of the body, used as the feed item description.
  pub fn summary(&self) -> String {
    self.body.as_deref().unwrap_or_default().chars().take(200).collect()
  }
}
