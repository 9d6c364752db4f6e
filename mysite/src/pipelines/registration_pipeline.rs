// mysite/src/pipelines/registration_pipeline.rs

use crate::db;
use crate::db::users::NewUser;
use crate::errors::{push_field_error, AppError, Result as AppResult};
use crate::pipelines::common_steps;
use crate::pipelines::contexts::RegistrationCtxData;
use crate::services::auth_service;
use flow::{ContextData, Pipeline, PipelineControl, Registry};
use tracing::{event, info, warn, Level};
use validator::ValidationErrors;

/// Registers the registration pipeline.
///
/// The steps are not wrapped in a transaction: a failure after
/// `create_user_account` leaves the account behind without a profile.
pub fn register_registration_pipeline(registry: &Registry<AppError>) -> AppResult<()> {
  let mut registration_p = Pipeline::<RegistrationCtxData, AppError>::new(&[
    ("validate_registration_input", false, None),
    ("create_user_account", false, None),
    ("create_empty_profile", false, None),
    ("open_session", false, None),
  ]);

  // Step 1: Validate input. Nothing is written if this fails.
  registration_p.on("validate_registration_input", |ctx_data: ContextData<RegistrationCtxData>| async move {
    let (username, password1, password2, db_pool) = {
      let guard = ctx_data.read();
      (
        guard.username.clone(),
        guard.password1.clone(),
        guard.password2.clone(),
        guard.app_state.db_pool.clone(),
      )
    };

    event!(Level::DEBUG, %username, "Validating registration input.");
    let mut errors = ValidationErrors::new();

    match auth_service::username_problem(&username) {
      Some(problem) => push_field_error(&mut errors, "username", "invalid", problem),
      None => {
        if db::users::username_exists(&db_pool, &username).await? {
          push_field_error(&mut errors, "username", "unique", "A user with that username already exists.");
        }
      }
    }

    if password1.is_empty() {
      push_field_error(&mut errors, "password1", "required", "This field is required.");
    }
    if password1 != password2 {
      push_field_error(&mut errors, "password2", "password_mismatch", "The two password fields didn't match.");
    } else {
      for problem in auth_service::password_problems(&password2, &username) {
        push_field_error(&mut errors, "password2", "password_weak", problem);
      }
    }

    if !errors.is_empty() {
      warn!(%username, "Registration input rejected.");
      return Err(AppError::Form(errors));
    }
    Ok::<_, AppError>(PipelineControl::Continue)
  })?;

  // Step 2: Create the account with a hashed password.
  registration_p.on("create_user_account", |ctx_data: ContextData<RegistrationCtxData>| async move {
    let (username, password, db_pool) = {
      let guard = ctx_data.read();
      (guard.username.clone(), guard.password1.clone(), guard.app_state.db_pool.clone())
    };

    let password_hash = auth_service::hash_password(&password)?;
    let new_user = NewUser {
      username,
      password_hash,
      ..NewUser::default()
    };
    let user = db::users::insert(&db_pool, &new_user).await?;

    ctx_data.write().created_user_id = Some(user.id);
    info!(user_id = user.id, username = %user.username, "User account created.");
    Ok::<_, AppError>(PipelineControl::Continue)
  })?;

  // Step 3: Every account gets exactly one profile.
  registration_p.on("create_empty_profile", |ctx_data: ContextData<RegistrationCtxData>| async move {
    let (user_id, db_pool) = {
      let guard = ctx_data.read();
      (guard.created_user_id, guard.app_state.db_pool.clone())
    };
    let user_id =
      user_id.ok_or_else(|| AppError::Internal("Profile step ran before the account was created.".to_string()))?;

    let profile = db::profiles::insert_empty(&db_pool, user_id).await?;
    ctx_data.write().profile_id = Some(profile.id);
    event!(Level::DEBUG, user_id, profile_id = profile.id, "Empty profile created.");
    Ok::<_, AppError>(PipelineControl::Continue)
  })?;

  // Step 4: Log the new user in.
  registration_p.on("open_session", |ctx_data: ContextData<RegistrationCtxData>| async move {
    let (user_id, app_state) = {
      let guard = ctx_data.read();
      (guard.created_user_id, guard.app_state.clone())
    };
    let user_id =
      user_id.ok_or_else(|| AppError::Internal("Session step ran before the account was created.".to_string()))?;

    let token = common_steps::open_session_step(&app_state, user_id).await?;
    ctx_data.write().session_token = Some(token);
    Ok::<_, AppError>(PipelineControl::Continue)
  })?;

  registry.register_pipeline(registration_p);
  tracing::info!("Registration pipeline registered.");
  Ok(())
}
