// mysite/src/web/forms.rs

//! Urlencoded form payloads and their validation.
//!
//! Every field defaults to empty so a missing field becomes a per-field
//! error instead of a deserialization failure.

use crate::db::orders::OrderFields;
use crate::db::products::ProductFields;
use crate::errors::{push_field_error, AppError, Result};
use crate::models::product::price_to_cents;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use validator::{Validate, ValidationErrors};

fn validated<T: Validate>(form: &T) -> ValidationErrors {
  match form.validate() {
    Ok(()) => ValidationErrors::new(),
    Err(errors) => errors,
  }
}

fn finish<T>(errors: ValidationErrors, value: T) -> Result<T> {
  if errors.is_empty() {
    Ok(value)
  } else {
    Err(AppError::Form(errors))
  }
}

fn non_empty(value: &str) -> Option<String> {
  let trimmed = value.trim();
  (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ProductForm {
  #[validate(length(min = 1, max = 100, message = "Ensure this value has 1 to 100 characters."))]
  pub name: String,
  pub price: String,
  pub description: String,
  pub discount: String,
  pub preview: String,
}

impl ProductForm {
  pub fn into_fields(self) -> Result<ProductFields> {
    let mut errors = validated(&self);

    let price_cents = match Decimal::from_str(self.price.trim()).ok() {
      None if self.price.trim().is_empty() => {
        push_field_error(&mut errors, "price", "required", "This field is required.");
        0
      }
      None => {
        push_field_error(&mut errors, "price", "invalid", "Enter a number.");
        0
      }
      Some(price) => price_to_cents(price).unwrap_or_else(|| {
        push_field_error(
          &mut errors,
          "price",
          "invalid",
          "Ensure the price is positive with at most 8 digits and 2 decimal places.",
        );
        0
      }),
    };

    let discount = match non_empty(&self.discount) {
      None => 0,
      Some(raw) => raw.parse::<i16>().map(i32::from).unwrap_or_else(|_| {
        push_field_error(&mut errors, "discount", "invalid", "Enter a whole number.");
        0
      }),
    };

    let fields = ProductFields {
      name: self.name.trim().to_string(),
      description: self.description,
      price_cents,
      discount,
      preview: non_empty(&self.preview),
    };
    finish(errors, fields)
  }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct OrderForm {
  pub user: String,
  pub delivery_address: String,
  #[validate(length(max = 20, message = "Ensure this value has at most 20 characters."))]
  pub promocode: String,
  /// Comma-separated product ids.
  pub products: String,
}

impl OrderForm {
  /// Returns the order fields and the product ids to attach.
  pub fn into_fields(self) -> Result<(OrderFields, Vec<i64>)> {
    let mut errors = validated(&self);

    let user_id = match non_empty(&self.user) {
      None => {
        push_field_error(&mut errors, "user", "required", "This field is required.");
        0
      }
      Some(raw) => raw.parse::<i64>().unwrap_or_else(|_| {
        push_field_error(&mut errors, "user", "invalid_choice", "Select a valid choice.");
        0
      }),
    };

    let mut product_ids = Vec::new();
    for raw in self.products.split(',').map(str::trim).filter(|s| !s.is_empty()) {
      match raw.parse::<i64>() {
        Ok(id) => product_ids.push(id),
        Err(_) => push_field_error(&mut errors, "products", "invalid_pk_value", format!("'{}' is not a valid value.", raw)),
      }
    }

    let fields = OrderFields {
      user_id,
      delivery_address: non_empty(&self.delivery_address),
      promocode: self.promocode.trim().to_string(),
    };
    finish(errors, (fields, product_ids))
  }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct GroupForm {
  #[validate(length(min = 1, max = 150, message = "Ensure this value has 1 to 150 characters."))]
  pub name: String,
}

impl GroupForm {
  pub fn into_name(self) -> Result<String> {
    let errors = validated(&self);
    finish(errors, self.name.trim().to_string())
  }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
  pub username: String,
  pub password: String,
  pub next: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
  pub username: String,
  pub password1: String,
  pub password2: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
  pub bio: String,
}

/// The request-data playground's bio form.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UserBioForm {
  #[validate(length(min = 1, max = 100, message = "Ensure this value has 1 to 100 characters."))]
  pub name: String,
  #[validate(length(min = 1, message = "This field is required."))]
  pub age: String,
  #[validate(length(min = 1, message = "This field is required."))]
  pub bio: String,
}

impl UserBioForm {
  pub fn check(self) -> Result<Self> {
    let errors = validated(&self);
    finish(errors, self)
  }
}

/// Only local paths are accepted as a post-login target.
pub fn safe_next(next: &str) -> Option<&str> {
  (next.starts_with('/') && !next.starts_with("//")).then_some(next)
}
