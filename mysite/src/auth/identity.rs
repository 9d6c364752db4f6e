// mysite/src/auth/identity.rs

use crate::auth::permissions::Permission;
use crate::db;
use crate::errors::Result;
use crate::models::{Product, Profile, User};
use sqlx::SqlitePool;
use std::collections::HashSet;
use tracing::{debug, instrument};

/// An authenticated user with their effective capability set
/// (direct grants plus group grants).
#[derive(Debug, Clone)]
pub struct Identity {
  pub user: User,
  permissions: HashSet<Permission>,
}

impl Identity {
  pub fn new(user: User, permissions: HashSet<Permission>) -> Self {
    Self { user, permissions }
  }

  /// Loads the user's grants. Codenames outside the known set are ignored.
  pub async fn load(pool: &SqlitePool, user: User) -> Result<Self> {
    let permissions = db::users::permission_codenames(pool, user.id)
      .await?
      .iter()
      .filter_map(|codename| codename.parse::<Permission>().ok())
      .collect();
    Ok(Self::new(user, permissions))
  }

  /// Resolves a session token. Expired sessions are removed and, like
  /// unknown tokens or inactive users, resolve to `None`.
  #[instrument(name = "auth::identity::from_session", skip_all, err(Display))]
  pub async fn from_session(pool: &SqlitePool, token: &str) -> Result<Option<Self>> {
    let Some(session) = db::sessions::find(pool, token).await? else {
      debug!("Unknown session token.");
      return Ok(None);
    };
    if session.is_expired() {
      debug!(user_id = session.user_id, "Session expired.");
      db::sessions::delete(pool, token).await?;
      return Ok(None);
    }
    match db::users::find_by_id(pool, session.user_id).await? {
      Some(user) if user.is_active => Ok(Some(Self::load(pool, user).await?)),
      _ => Ok(None),
    }
  }

  pub fn id(&self) -> i64 {
    self.user.id
  }

  pub fn is_staff(&self) -> bool {
    self.user.is_staff
  }

  pub fn is_superuser(&self) -> bool {
    self.user.is_superuser
  }

  /// Superusers implicitly hold every permission.
  pub fn has_perm(&self, permission: Permission) -> bool {
    self.user.is_superuser || self.permissions.contains(&permission)
  }

  /// Codenames this identity holds, sorted, for display.
  pub fn permission_codenames(&self) -> Vec<&'static str> {
    let mut codenames: Vec<&'static str> = Permission::ALL
      .iter()
      .copied()
      .filter(|p| self.has_perm(*p))
      .map(Permission::codename)
      .collect();
    codenames.sort_unstable();
    codenames
  }

  /// Product edit ownership: superuser, or `change_product` on a product
  /// this user created.
  pub fn can_edit_product(&self, product: &Product) -> bool {
    self.is_superuser() || (self.has_perm(Permission::ChangeProduct) && product.created_by == self.id())
  }

  /// Profile edit ownership: superuser, staff, the owner, or `change_profile`.
  pub fn can_edit_profile(&self, profile: &Profile) -> bool {
    self.is_superuser() || self.is_staff() || profile.user_id == self.id() || self.has_perm(Permission::ChangeProfile)
  }
}
