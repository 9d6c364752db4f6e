// mysite/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  /// Used to build absolute links (RSS items).
  pub app_base_url: String,

  /// Where the authentication gate sends anonymous visitors.
  pub login_url: String,
  pub media_root: PathBuf,

  pub session_cookie_name: String,
  pub session_ttl_secs: i64,

  // Optional: for seeding demo data on startup
  pub seed_db: bool,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL").unwrap_or_else(|_| "sqlite://mysite.db?mode=rwc".to_string());
    let app_base_url = get_env("APP_BASE_URL").unwrap_or_else(|_| format!("http://{}:{}", server_host, server_port));

    let login_url = get_env("LOGIN_URL").unwrap_or_else(|_| "/login/".to_string());
    if !login_url.starts_with('/') {
      return Err(AppError::Config(format!("LOGIN_URL must be a local path, got '{}'", login_url)));
    }
    let media_root = PathBuf::from(get_env("MEDIA_ROOT").unwrap_or_else(|_| "media".to_string()));

    let session_cookie_name = get_env("SESSION_COOKIE_NAME").unwrap_or_else(|_| "sessionid".to_string());
    let session_ttl_secs = get_env("SESSION_TTL_SECS")
      .unwrap_or_else(|_| "1209600".to_string())
      .parse::<i64>()
      .map_err(|e| AppError::Config(format!("Invalid SESSION_TTL_SECS: {}", e)))?;

    let seed_db = get_env("SEED_DB")
      .unwrap_or_else(|_| "false".to_string())
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid SEED_DB value: {}", e)))?;

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      app_base_url,
      login_url,
      media_root,
      session_cookie_name,
      session_ttl_secs,
      seed_db,
    })
  }
}
