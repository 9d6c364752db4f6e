// mysite/src/pipelines/common_steps.rs

//! Step bodies shared by more than one pipeline.

use crate::db;
use crate::errors::Result as AppResult;
use crate::state::AppState;
use tracing::{info, instrument};

/// Opens a session for `user_id` and returns the token for the cookie.
#[instrument(name = "common_step::open_session", skip(app_state), err(Display))]
pub async fn open_session_step(app_state: &AppState, user_id: i64) -> AppResult<String> {
  let token = db::sessions::create(&app_state.db_pool, user_id, app_state.config.session_ttl_secs).await?;
  info!(user_id, "Session opened.");
  Ok(token)
}
