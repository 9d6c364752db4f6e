// mysite/src/services/auth_service.rs

//! Password hashing, credential rules and session cookies.

use crate::config::AppConfig;
use crate::errors::AppError;
use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use tracing::{debug, error, instrument};

pub const USERNAME_MAX_LEN: usize = 150;
pub const PASSWORD_MIN_LEN: usize = 8;

const COMMON_PASSWORDS: &[&str] = &[
  "password", "password1", "12345678", "123456789", "1234567890", "qwerty123", "qwertyuiop", "iloveyou",
  "admin123", "letmein1", "welcome1", "11111111", "abc12345",
];

/// Hashes a plain-text password using Argon2 with a random salt.
#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
  debug!("Attempting to hash password.");
  if password.is_empty() {
    error!("Password hashing failed: Password cannot be empty.");
    return Err(AppError::Validation("Password cannot be empty for hashing.".to_string()));
  }

  let salt = SaltString::generate(&mut OsRng);
  let argon2_hasher = Argon2::default();

  match argon2_hasher.hash_password(password.as_bytes(), &salt) {
    Ok(password_hash_obj) => {
      debug!("Password hashed successfully.");
      Ok(password_hash_obj.to_string())
    }
    Err(argon_err) => {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      Err(AppError::Internal(format!("Password hashing process failed: {}", argon_err)))
    }
  }
}

/// Verifies a plain-text password against a stored Argon2 hash.
///
/// Returns `Ok(false)` on mismatch; an unparsable stored hash is an
/// internal error.
#[instrument(name = "auth_service::verify_password", skip(hashed_password_str, provided_password), err(Display), fields(hash_len = hashed_password_str.len()))]
pub fn verify_password(hashed_password_str: &str, provided_password: &str) -> Result<bool, AppError> {
  if hashed_password_str.is_empty() || provided_password.is_empty() {
    debug!("Password verification short-circuited on empty input.");
    return Ok(false);
  }

  let parsed_hash = PasswordHash::new(hashed_password_str).map_err(|parse_err| {
    error!(error = %parse_err, "Failed to parse stored password hash string.");
    AppError::Internal(format!("Invalid stored password hash format: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password verification failed: Passwords do not match.");
      Ok(false)
    }
    Err(other_argon_err) => {
      error!(error = %other_argon_err, "Argon2 password verification process encountered an error.");
      Err(AppError::Internal(format!("Password verification process failed: {}", other_argon_err)))
    }
  }
}

/// Usernames: 1 to 150 characters, letters, digits and `@.+-_` only.
pub fn username_problem(username: &str) -> Option<String> {
  if username.is_empty() {
    return Some("This field is required.".to_string());
  }
  if username.chars().count() > USERNAME_MAX_LEN {
    return Some(format!("Ensure this value has at most {} characters.", USERNAME_MAX_LEN));
  }
  if !username.chars().all(|c| c.is_alphanumeric() || "@.+-_".contains(c)) {
    return Some(
      "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.".to_string(),
    );
  }
  None
}

/// Password strength rules. Returns every rule the password breaks.
pub fn password_problems(password: &str, username: &str) -> Vec<String> {
  let mut problems = Vec::new();
  if password.chars().count() < PASSWORD_MIN_LEN {
    problems.push(format!(
      "This password is too short. It must contain at least {} characters.",
      PASSWORD_MIN_LEN
    ));
  }
  if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
    problems.push("This password is entirely numeric.".to_string());
  }
  if COMMON_PASSWORDS.contains(&password.to_lowercase().as_str()) {
    problems.push("This password is too common.".to_string());
  }
  if !username.is_empty() && password.to_lowercase().contains(&username.to_lowercase()) {
    problems.push("The password is too similar to the username.".to_string());
  }
  problems
}

/// Session cookie carrying `token`: HttpOnly, whole-site path.
pub fn session_cookie(config: &AppConfig, token: &str) -> Cookie<'static> {
  Cookie::build(config.session_cookie_name.clone(), token.to_string())
    .path("/")
    .http_only(true)
    .same_site(SameSite::Lax)
    .max_age(CookieDuration::seconds(config.session_ttl_secs))
    .finish()
}

/// A cookie that makes the browser drop the session cookie.
pub fn expired_session_cookie(config: &AppConfig) -> Cookie<'static> {
  let mut cookie = Cookie::build(config.session_cookie_name.clone(), String::new())
    .path("/")
    .http_only(true)
    .finish();
  cookie.make_removal();
  cookie
}
