// mysite/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use mysite::config::AppConfig;
use mysite::services::admin_commands;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting mysite server...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => cfg,
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(std::io::Error::other(e.to_string()));
    }
  };
  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  let seed_db = app_config.seed_db;

  let app_state = match mysite::build_state(app_config).await {
    Ok(state) => state,
    Err(e) => {
      tracing::error!(error = %e, "Failed to initialise application state.");
      return Err(std::io::Error::other(e.to_string()));
    }
  };

  if seed_db {
    if let Err(e) = admin_commands::seed_demo_data(&app_state).await {
      tracing::error!(error = %e, "Failed to seed database.");
    }
  }

  if let Err(e) = tokio::fs::create_dir_all(&app_state.config.media_root).await {
    tracing::warn!(error = %e, "Could not create the media root.");
  }

  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone())) // Share AppState with handlers
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(mysite::web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
