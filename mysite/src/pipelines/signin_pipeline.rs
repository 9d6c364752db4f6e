// mysite/src/pipelines/signin_pipeline.rs

use crate::db;
use crate::errors::{push_field_error, AppError, Result as AppResult};
use crate::pipelines::common_steps;
use crate::pipelines::contexts::SigninCtxData;
use crate::services::auth_service;
use flow::{ContextData, Pipeline, PipelineControl, Registry};
use tracing::{event, warn, Level};
use validator::ValidationErrors;

const INVALID_CREDENTIALS: &str = "Invalid Login Credentials";

/// Registers the sign-in pipeline.
pub fn register_signin_pipeline(registry: &Registry<AppError>) -> AppResult<()> {
  let mut signin_p = Pipeline::<SigninCtxData, AppError>::new(&[
    ("validate_signin_input", false, None),
    ("fetch_account", false, None),
    ("verify_account_password", false, None),
    ("open_session", false, None),
  ]);

  signin_p.on("validate_signin_input", |ctx_data: ContextData<SigninCtxData>| async move {
    let (username_is_empty, password_is_empty) = {
      let guard = ctx_data.read();
      (guard.username.is_empty(), guard.password.is_empty())
    };

    let mut errors = ValidationErrors::new();
    if username_is_empty {
      push_field_error(&mut errors, "username", "required", "This field is required.");
    }
    if password_is_empty {
      push_field_error(&mut errors, "password", "required", "This field is required.");
    }
    if !errors.is_empty() {
      return Err(AppError::Form(errors));
    }
    Ok::<_, AppError>(PipelineControl::Continue)
  })?;

  // Unknown and inactive accounts fail the same way as a wrong password.
  signin_p.on("fetch_account", |ctx_data: ContextData<SigninCtxData>| async move {
    let (username, db_pool) = {
      let guard = ctx_data.read();
      (guard.username.clone(), guard.app_state.db_pool.clone())
    };

    event!(Level::DEBUG, %username, "Fetching account for sign-in.");
    match db::users::find_by_username(&db_pool, &username).await? {
      Some(user) if user.is_active => {
        ctx_data.write().account = Some(user);
        Ok::<_, AppError>(PipelineControl::Continue)
      }
      _ => {
        warn!(%username, "Sign-in for unknown or inactive account.");
        Err(AppError::Validation(INVALID_CREDENTIALS.to_string()))
      }
    }
  })?;

  signin_p.on("verify_account_password", |ctx_data: ContextData<SigninCtxData>| async move {
    let (password_hash, password) = {
      let guard = ctx_data.read();
      let hash = guard.account.as_ref().map(|u| u.password_hash.clone()).unwrap_or_default();
      (hash, guard.password.clone())
    };

    if auth_service::verify_password(&password_hash, &password)? {
      Ok::<_, AppError>(PipelineControl::Continue)
    } else {
      warn!("Sign-in password mismatch.");
      Err(AppError::Validation(INVALID_CREDENTIALS.to_string()))
    }
  })?;

  signin_p.on("open_session", |ctx_data: ContextData<SigninCtxData>| async move {
    let (user_id, app_state) = {
      let guard = ctx_data.read();
      (guard.account.as_ref().map(|u| u.id), guard.app_state.clone())
    };
    let user_id = user_id.ok_or_else(|| AppError::Internal("Session step ran without an account.".to_string()))?;

    let token = common_steps::open_session_step(&app_state, user_id).await?;
    ctx_data.write().session_token = Some(token);
    Ok::<_, AppError>(PipelineControl::Continue)
  })?;

  registry.register_pipeline(signin_p);
  tracing::info!("Sign-in pipeline registered.");
  Ok(())
}
