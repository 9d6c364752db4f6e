// mysite/src/auth/guards.rs

//! `CurrentUser` extractor and the ordered gates built on it.

use crate::auth::identity::Identity;
use crate::auth::permissions::Permission;
use crate::errors::{AppError, Result};
use crate::state::AppState;
use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use tracing::debug;

/// Who is making the request, resolved from the session cookie.
///
/// Extraction never fails for anonymous visitors; handlers decide which
/// gates to apply.
#[derive(Debug, Clone)]
pub struct CurrentUser {
  pub identity: Option<Identity>,
  pub session_token: Option<String>,
  /// Path and query of the request, used as the login `next` target.
  pub requested_path: String,
  login_url: String,
}

impl CurrentUser {
  pub fn is_authenticated(&self) -> bool {
    self.identity.is_some()
  }

  /// Authentication gate: anonymous visitors are sent to the login URL with
  /// `next` pointing back here.
  pub fn require_login(&self) -> Result<&Identity> {
    match &self.identity {
      Some(identity) => Ok(identity),
      None => {
        let next = serde_urlencoded::to_string([("next", self.requested_path.as_str())])
          .map_err(|e| AppError::Internal(format!("Failed to encode login redirect: {}", e)))?;
        debug!(requested_path = %self.requested_path, "Anonymous request, redirecting to login.");
        Err(AppError::LoginRequired {
          location: format!("{}?{}", self.login_url, next),
        })
      }
    }
  }

  /// Authentication gate followed by a permission gate.
  pub fn require_perm(&self, permission: Permission) -> Result<&Identity> {
    let identity = self.require_login()?;
    if identity.has_perm(permission) {
      Ok(identity)
    } else {
      debug!(user_id = identity.id(), %permission, "Permission denied.");
      Err(AppError::Forbidden(format!("Permission '{}' required.", permission)))
    }
  }

  /// Authentication gate followed by a staff check.
  pub fn require_staff(&self) -> Result<&Identity> {
    let identity = self.require_login()?;
    if identity.is_staff() || identity.is_superuser() {
      Ok(identity)
    } else {
      Err(AppError::Forbidden("Staff access required.".to_string()))
    }
  }

  /// JSON API variant: anonymous writes get 403, never a redirect.
  pub fn require_api_auth(&self) -> Result<&Identity> {
    self
      .identity
      .as_ref()
      .ok_or_else(|| AppError::Forbidden("Authentication credentials were not provided.".to_string()))
  }
}

impl FromRequest for CurrentUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let state = req.app_data::<web::Data<AppState>>().cloned();
    let requested_path = req
      .uri()
      .path_and_query()
      .map(|pq| pq.as_str().to_string())
      .unwrap_or_else(|| req.path().to_string());
    let session_token = state
      .as_ref()
      .and_then(|s| req.cookie(&s.config.session_cookie_name))
      .map(|cookie| cookie.value().to_string());

    Box::pin(async move {
      let state = state.ok_or_else(|| AppError::Internal("Application state is not configured.".to_string()))?;
      let identity = match &session_token {
        Some(token) => Identity::from_session(&state.db_pool, token).await?,
        None => None,
      };
      Ok(CurrentUser {
        identity,
        session_token,
        requested_path,
        login_url: state.config.login_url.clone(),
      })
    })
  }
}
