// mysite/tests/common/mod.rs
#![allow(dead_code, unused_macros)]

use actix_web::cookie::Cookie;
use mysite::auth::Permission;
use mysite::config::AppConfig;
use mysite::db;
use mysite::db::products::ProductFields;
use mysite::db::users::NewUser;
use mysite::models::{Product, User};
use mysite::services::auth_service;
use mysite::state::AppState;
use once_cell::sync::Lazy;
use std::path::PathBuf;
use tracing::Level;

pub const TEST_PASSWORD: &str = "correct-horse-42";

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

/// A fresh media directory per test so uploads never collide.
pub fn temp_media_root() -> PathBuf {
  std::env::temp_dir().join(format!("mysite-test-media-{}", uuid::Uuid::new_v4().simple()))
}

pub fn test_config() -> AppConfig {
  AppConfig {
    server_host: "127.0.0.1".to_string(),
    server_port: 8080,
    database_url: "sqlite::memory:".to_string(),
    app_base_url: "http://testserver".to_string(),
    login_url: "/login/".to_string(),
    media_root: temp_media_root(),
    session_cookie_name: "sessionid".to_string(),
    session_ttl_secs: 3600,
    seed_db: false,
  }
}

/// In-memory database, migrated, with every pipeline registered.
pub async fn test_state() -> AppState {
  setup_tracing();
  mysite::build_state(test_config()).await.expect("test state")
}

/// Builds the actix test service over `$state`.
macro_rules! init_app {
  ($state:expr) => {
    actix_web::test::init_service(
      actix_web::App::new()
        .app_data(actix_web::web::Data::new($state.clone()))
        .configure(mysite::web::configure_app_routes),
    )
    .await
  };
}

pub async fn create_user(state: &AppState, username: &str) -> User {
  let new_user = NewUser {
    username: username.to_string(),
    password_hash: auth_service::hash_password(TEST_PASSWORD).expect("hash"),
    ..NewUser::default()
  };
  let user = db::users::insert(&state.db_pool, &new_user).await.expect("insert user");
  db::profiles::insert_empty(&state.db_pool, user.id).await.expect("insert profile");
  user
}

pub async fn create_staff(state: &AppState, username: &str) -> User {
  let user = create_user(state, username).await;
  db::users::set_staff(&state.db_pool, user.id, true).await.expect("set staff");
  db::users::get_by_id(&state.db_pool, user.id).await.expect("reload user")
}

pub async fn grant(state: &AppState, user: &User, permission: Permission) {
  db::users::grant_permission(&state.db_pool, user.id, permission.codename())
    .await
    .expect("grant permission");
}

/// Opens a session for `user` and returns the cookie a browser would send.
pub async fn login_cookie(state: &AppState, user: &User) -> Cookie<'static> {
  let token = db::sessions::create(&state.db_pool, user.id, state.config.session_ttl_secs)
    .await
    .expect("open session");
  auth_service::session_cookie(&state.config, &token)
}

pub async fn create_product(state: &AppState, owner: &User, name: &str, price_cents: i64) -> Product {
  let fields = ProductFields {
    name: name.to_string(),
    description: format!("{} description", name),
    price_cents,
    ..ProductFields::default()
  };
  db::products::insert(&state.db_pool, &fields, owner.id).await.expect("insert product")
}

pub const MULTIPART_BOUNDARY: &str = "mysite-test-boundary";

/// A single-file `multipart/form-data` body and its content type.
pub fn multipart_body(field: &str, filename: &str, data: &[u8]) -> (String, Vec<u8>) {
  let mut body = Vec::new();
  body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
  body.extend_from_slice(
    format!(
      "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
      field, filename
    )
    .as_bytes(),
  );
  body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
  body.extend_from_slice(data);
  body.extend_from_slice(format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
  (format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY), body)
}
