// mysite/src/services/feed.rs

//! RSS 2.0 feed of the latest published articles.

use crate::models::Article;
use chrono::Utc;
use rss::{Channel, Guid, Item};

pub const FEED_TITLE: &str = "Blog articles (latest)";
pub const FEED_DESCRIPTION: &str = "Updates on changes and addition blog articles";
pub const FEED_ITEM_LIMIT: i64 = 5;

/// Renders the channel. `base_url` makes the article links absolute.
pub fn latest_articles_feed(base_url: &str, articles: &[Article]) -> String {
  let base_url = base_url.trim_end_matches('/');

  let items: Vec<Item> = articles
    .iter()
    .map(|article| {
      let link = format!("{}{}", base_url, article.absolute_path());
      let mut guid = Guid::default();
      guid.set_value(link.clone());
      guid.set_permalink(true);

      let mut item = Item::default();
      item.set_title(article.title.clone());
      item.set_description(article.summary());
      item.set_link(link);
      item.set_guid(guid);
      item
    })
    .collect();

  let mut channel = Channel::default();
  channel.set_title(FEED_TITLE);
  channel.set_link(format!("{}/blog/", base_url));
  channel.set_description(FEED_DESCRIPTION);
  channel.set_last_build_date(Utc::now().to_rfc2822());
  channel.set_items(items);
  channel.to_string()
}
