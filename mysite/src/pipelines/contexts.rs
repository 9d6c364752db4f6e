// mysite/src/pipelines/contexts.rs

//! Underlying data structs for the application's pipelines.
//! Handlers receive these wrapped in `flow::ContextData`.

use crate::db::products::ProductFields;
use crate::models::{Order, Product, User};
use crate::state::AppState;

#[derive(Clone)]
pub struct RegistrationCtxData {
  pub app_state: AppState,
  pub username: String,
  pub password1: String,
  pub password2: String,
  // Populated by the pipeline:
  pub created_user_id: Option<i64>,
  pub profile_id: Option<i64>,
  pub session_token: Option<String>,
}

impl RegistrationCtxData {
  pub fn new(app_state: AppState, username: String, password1: String, password2: String) -> Self {
    Self {
      app_state,
      username,
      password1,
      password2,
      created_user_id: None,
      profile_id: None,
      session_token: None,
    }
  }
}

#[derive(Clone)]
pub struct SigninCtxData {
  pub app_state: AppState,
  pub username: String,
  pub password: String,
  pub account: Option<User>,
  pub session_token: Option<String>,
}

impl SigninCtxData {
  pub fn new(app_state: AppState, username: String, password: String) -> Self {
    Self {
      app_state,
      username,
      password,
      account: None,
      session_token: None,
    }
  }
}

#[derive(Clone)]
pub struct CsvImportCtxData {
  pub app_state: AppState,
  pub owner_id: i64,
  pub raw_csv: Vec<u8>,
  pub parsed_rows: Vec<ProductFields>,
  pub created_products: Vec<Product>,
}

impl CsvImportCtxData {
  pub fn new(app_state: AppState, owner_id: i64, raw_csv: Vec<u8>) -> Self {
    Self {
      app_state,
      owner_id,
      raw_csv,
      parsed_rows: Vec::new(),
      created_products: Vec::new(),
    }
  }
}

/// Get-or-create of one order per user and address/promocode pair,
/// attached to every product.
#[derive(Clone)]
pub struct OrderBundleCtxData {
  pub app_state: AppState,
  pub username: String,
  pub delivery_address: String,
  pub promocode: String,
  pub owner_id: Option<i64>,
  pub order: Option<Order>,
  pub order_created: bool,
  pub product_ids: Vec<i64>,
}

impl OrderBundleCtxData {
  pub fn new(app_state: AppState, username: String, delivery_address: String, promocode: String) -> Self {
    Self {
      app_state,
      username,
      delivery_address,
      promocode,
      owner_id: None,
      order: None,
      order_created: false,
      product_ids: Vec::new(),
    }
  }
}
