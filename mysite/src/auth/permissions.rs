// mysite/src/auth/permissions.rs

use crate::errors::AppError;
use std::fmt;
use std::str::FromStr;

/// The closed set of capabilities a user or group can be granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
  AddProduct,
  ChangeProduct,
  DeleteProduct,
  ViewProduct,
  AddOrder,
  ChangeOrder,
  DeleteOrder,
  ViewOrder,
  ChangeProfile,
  ViewProfile,
}

impl Permission {
  pub const ALL: [Permission; 10] = [
    Permission::AddProduct,
    Permission::ChangeProduct,
    Permission::DeleteProduct,
    Permission::ViewProduct,
    Permission::AddOrder,
    Permission::ChangeOrder,
    Permission::DeleteOrder,
    Permission::ViewOrder,
    Permission::ChangeProfile,
    Permission::ViewProfile,
  ];

  /// Stored form, e.g. `shopapp.view_order`.
  pub fn codename(self) -> &'static str {
    match self {
      Permission::AddProduct => "shopapp.add_product",
      Permission::ChangeProduct => "shopapp.change_product",
      Permission::DeleteProduct => "shopapp.delete_product",
      Permission::ViewProduct => "shopapp.view_product",
      Permission::AddOrder => "shopapp.add_order",
      Permission::ChangeOrder => "shopapp.change_order",
      Permission::DeleteOrder => "shopapp.delete_order",
      Permission::ViewOrder => "shopapp.view_order",
      Permission::ChangeProfile => "myauth.change_profile",
      Permission::ViewProfile => "myauth.view_profile",
    }
  }
}

impl fmt::Display for Permission {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.codename())
  }
}

impl FromStr for Permission {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Permission::ALL
      .iter()
      .copied()
      .find(|p| p.codename() == s)
      .ok_or_else(|| AppError::Validation(format!("Unknown permission '{}'.", s)))
  }
}
