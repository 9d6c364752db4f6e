// mysite/src/web/handlers/account_handlers.rs

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::auth::CurrentUser;
use crate::db;
use crate::errors::AppError;
use crate::models::Profile;
use crate::pipelines::contexts::{RegistrationCtxData, SigninCtxData};
use crate::services::{auth_service, uploads};
use crate::state::AppState;
use crate::web::forms::{safe_next, LoginForm, ProfileForm, RegisterForm};
use crate::web::redirect;
use flow::{ContextData, PipelineResult};

pub const AFTER_LOGIN_PATH: &str = "/about-me/";
pub const AVATAR_FIELD: &str = "avatar";

fn redirect_with_session(app_state: &AppState, location: &str, token: &str) -> HttpResponse {
  let mut response = redirect(location);
  if let Err(e) = response.add_cookie(&auth_service::session_cookie(&app_state.config, token)) {
    warn!(error = %e, "Failed to attach session cookie.");
  }
  response
}

pub async fn login_form_handler(current: CurrentUser) -> HttpResponse {
  if current.is_authenticated() {
    return redirect(AFTER_LOGIN_PATH);
  }
  HttpResponse::Ok().json(json!({ "form": { "fields": ["username", "password"] } }))
}

#[instrument(name = "handler::signin", skip(app_state, form), fields(username = %form.username))]
pub async fn signin_handler(
  app_state: web::Data<AppState>,
  form: web::Form<LoginForm>,
) -> Result<HttpResponse, AppError> {
  let LoginForm { username, password, next } = form.into_inner();
  let ctx_data = ContextData::new(SigninCtxData::new(app_state.get_ref().clone(), username, password));

  match app_state.flows.run(ctx_data.clone()).await {
    Ok(PipelineResult::Completed) => {
      let token = ctx_data
        .read()
        .session_token
        .clone()
        .ok_or_else(|| AppError::Internal("Sign-in completed without a session.".to_string()))?;
      let location = safe_next(&next).unwrap_or(AFTER_LOGIN_PATH);
      info!("Sign-in successful.");
      Ok(redirect_with_session(&app_state, location, &token))
    }
    Ok(PipelineResult::Stopped) => {
      warn!("Sign-in pipeline was stopped by a handler.");
      Err(AppError::PipelineHaltedByHandler)
    }
    Err(app_err) => {
      warn!("Sign-in failed: {}", app_err);
      Err(app_err)
    }
  }
}

pub async fn logout_handler(app_state: web::Data<AppState>, current: CurrentUser) -> Result<HttpResponse, AppError> {
  if let Some(token) = &current.session_token {
    db::sessions::delete(&app_state.db_pool, token).await?;
  }
  let mut response = redirect(&app_state.config.login_url);
  if let Err(e) = response.add_cookie(&auth_service::expired_session_cookie(&app_state.config)) {
    warn!(error = %e, "Failed to expire session cookie.");
  }
  Ok(response)
}

pub async fn register_form_handler() -> HttpResponse {
  HttpResponse::Ok().json(json!({ "form": { "fields": ["username", "password1", "password2"] } }))
}

/// Creates the account and its profile, then logs the new user in.
#[instrument(name = "handler::register", skip(app_state, form), fields(username = %form.username))]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  form: web::Form<RegisterForm>,
) -> Result<HttpResponse, AppError> {
  let RegisterForm {
    username,
    password1,
    password2,
  } = form.into_inner();
  let ctx_data = ContextData::new(RegistrationCtxData::new(
    app_state.get_ref().clone(),
    username,
    password1,
    password2,
  ));

  match app_state.flows.run(ctx_data.clone()).await {
    Ok(PipelineResult::Completed) => {
      let (user_id, token) = {
        let guard = ctx_data.read();
        (guard.created_user_id, guard.session_token.clone())
      };
      let token = token.ok_or_else(|| AppError::Internal("Registration completed without a session.".to_string()))?;
      info!(?user_id, "Registration successful.");
      Ok(redirect_with_session(&app_state, AFTER_LOGIN_PATH, &token))
    }
    Ok(PipelineResult::Stopped) => {
      warn!("Registration pipeline was stopped by a handler.");
      Err(AppError::PipelineHaltedByHandler)
    }
    Err(app_err) => {
      warn!("Registration failed: {}", app_err);
      Err(app_err)
    }
  }
}

/// Anonymous visitors get an empty page rather than a redirect.
pub async fn about_me_handler(app_state: web::Data<AppState>, current: CurrentUser) -> Result<HttpResponse, AppError> {
  let Some(identity) = &current.identity else {
    return Ok(HttpResponse::Ok().json(json!({ "user": Value::Null, "profile": Value::Null })));
  };
  let profile = db::profiles::find_by_user(&app_state.db_pool, identity.id()).await?;
  Ok(HttpResponse::Ok().json(json!({
    "user": identity.user,
    "profile": profile,
    "permissions": identity.permission_codenames(),
  })))
}

pub async fn users_list_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let users = db::users::list(&app_state.db_pool).await?;
  Ok(HttpResponse::Ok().json(json!({ "users": users })))
}

pub async fn user_detail_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let user = db::users::get_by_id(&app_state.db_pool, path.into_inner()).await?;
  let profile = db::profiles::find_by_user(&app_state.db_pool, user.id).await?;
  Ok(HttpResponse::Ok().json(json!({ "user": user, "profile": profile })))
}

/// Authentication gate, then profile ownership.
async fn editable_profile(app_state: &AppState, current: &CurrentUser, profile_id: i64) -> Result<Profile, AppError> {
  let identity = current.require_login()?;
  let profile = db::profiles::find_by_id(&app_state.db_pool, profile_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Profile {} not found.", profile_id)))?;
  if !identity.can_edit_profile(&profile) {
    return Err(AppError::Forbidden("You cannot edit this profile.".to_string()));
  }
  Ok(profile)
}

pub async fn profile_update_form_handler(
  app_state: web::Data<AppState>,
  current: CurrentUser,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let profile = editable_profile(&app_state, &current, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({
    "form": { "fields": ["bio", AVATAR_FIELD] },
    "profile": profile,
  })))
}

#[instrument(name = "handler::profile_update", skip(app_state, current, form), err(Display))]
pub async fn profile_update_handler(
  app_state: web::Data<AppState>,
  current: CurrentUser,
  path: web::Path<i64>,
  form: web::Form<ProfileForm>,
) -> Result<HttpResponse, AppError> {
  let profile = editable_profile(&app_state, &current, path.into_inner()).await?;
  db::profiles::update_bio(&app_state.db_pool, profile.id, &form.bio).await?;
  info!(profile_id = profile.id, "Profile updated.");
  Ok(redirect(&format!("/users/{}/", profile.user_id)))
}

/// Multipart `avatar` upload, stored under `users/user_<id>/avatar/`.
#[instrument(name = "handler::profile_avatar", skip(app_state, current, payload), err(Display))]
pub async fn profile_avatar_handler(
  app_state: web::Data<AppState>,
  current: CurrentUser,
  path: web::Path<i64>,
  payload: Multipart,
) -> Result<HttpResponse, AppError> {
  let profile = editable_profile(&app_state, &current, path.into_inner()).await?;
  let subdir = format!("users/user_{}/avatar", profile.user_id);
  let stored = uploads::store_field(payload, AVATAR_FIELD, &app_state.config.media_root, &subdir).await?;
  db::profiles::set_avatar(&app_state.db_pool, profile.id, &stored.name).await?;
  info!(profile_id = profile.id, avatar = %stored.name, "Avatar updated.");
  Ok(redirect(&format!("/users/{}/", profile.user_id)))
}
