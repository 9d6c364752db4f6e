// mysite/src/web/mod.rs

pub mod forms;
pub mod handlers;
pub mod routes;

pub use routes::configure_app_routes;

use actix_web::http::header;
use actix_web::HttpResponse;

/// `302 Found` to `location`.
pub fn redirect(location: &str) -> HttpResponse {
  HttpResponse::Found().insert_header((header::LOCATION, location)).finish()
}
