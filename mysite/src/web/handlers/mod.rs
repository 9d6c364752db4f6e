// mysite/src/web/handlers/mod.rs

pub mod account_handlers;
pub mod api_handlers;
pub mod blog_handlers;
pub mod export_handlers;
pub mod order_handlers;
pub mod product_handlers;
pub mod request_data_handlers;
pub mod shop_handlers;
