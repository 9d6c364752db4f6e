// mysite/src/services/mod.rs

pub mod admin_commands;
pub mod auth_service;
pub mod cache;
pub mod feed;
pub mod product_csv;
pub mod uploads;
