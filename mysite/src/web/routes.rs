// mysite/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{
  account_handlers, api_handlers, blog_handlers, export_handlers, order_handlers, product_handlers,
  request_data_handlers, shop_handlers,
};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// Literal segments (`create/`, `export/`, `download_csv/`) are registered
// before the `{id}` routes of the same scope.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .route("/", web::get().to(shop_handlers::main_index_handler))
    .route("/health", web::get().to(health_check_handler))
    .route("/shop/", web::get().to(shop_handlers::shop_index_handler))
    .service(
      web::resource("/groups/")
        .route(web::get().to(shop_handlers::groups_list_handler))
        .route(web::post().to(shop_handlers::group_create_handler)),
    )
    // Shop: products
    .service(
      web::scope("/products")
        .route("/", web::get().to(product_handlers::list_products_handler))
        .service(
          web::resource("/create/")
            .route(web::get().to(product_handlers::create_product_form_handler))
            .route(web::post().to(product_handlers::create_product_handler)),
        )
        .route("/export/", web::get().to(export_handlers::products_export_handler))
        .route("/{id}/", web::get().to(product_handlers::get_product_handler))
        .service(
          web::resource("/{id}/update/")
            .route(web::get().to(product_handlers::update_product_form_handler))
            .route(web::post().to(product_handlers::update_product_handler)),
        )
        .service(
          web::resource("/{id}/archive/")
            .route(web::get().to(product_handlers::archive_product_form_handler))
            .route(web::post().to(product_handlers::archive_product_handler)),
        ),
    )
    // Shop: orders
    .service(
      web::scope("/orders")
        .route("/", web::get().to(order_handlers::list_orders_handler))
        .service(
          web::resource("/create/")
            .route(web::get().to(order_handlers::create_order_form_handler))
            .route(web::post().to(order_handlers::create_order_handler)),
        )
        .route("/export/", web::get().to(export_handlers::orders_export_handler))
        .route("/{id}/", web::get().to(order_handlers::get_order_handler))
        .service(
          web::resource("/{id}/update/")
            .route(web::get().to(order_handlers::update_order_form_handler))
            .route(web::post().to(order_handlers::update_order_handler)),
        )
        .service(
          web::resource("/{id}/archive/")
            .route(web::get().to(order_handlers::archive_order_form_handler))
            .route(web::post().to(order_handlers::archive_order_handler)),
        ),
    )
    // Accounts
    .service(
      web::resource("/login/")
        .route(web::get().to(account_handlers::login_form_handler))
        .route(web::post().to(account_handlers::signin_handler)),
    )
    .service(
      web::resource("/logout/")
        .route(web::get().to(account_handlers::logout_handler))
        .route(web::post().to(account_handlers::logout_handler)),
    )
    .service(
      web::resource("/register/")
        .route(web::get().to(account_handlers::register_form_handler))
        .route(web::post().to(account_handlers::register_handler)),
    )
    .route("/about-me/", web::get().to(account_handlers::about_me_handler))
    .service(
      web::scope("/users")
        .route("/", web::get().to(account_handlers::users_list_handler))
        .route("/{id}/", web::get().to(account_handlers::user_detail_handler))
        .route("/{id}/orders/", web::get().to(order_handlers::user_orders_handler))
        .route(
          "/{id}/orders/export/",
          web::get().to(export_handlers::user_orders_export_handler),
        ),
    )
    .service(
      web::scope("/profiles")
        .service(
          web::resource("/{id}/update/")
            .route(web::get().to(account_handlers::profile_update_form_handler))
            .route(web::post().to(account_handlers::profile_update_handler)),
        )
        .route("/{id}/avatar/", web::post().to(account_handlers::profile_avatar_handler)),
    )
    // JSON API
    .service(
      web::scope("/api")
        .service(
          web::resource("/products/")
            .route(web::get().to(api_handlers::api_products_list_handler))
            .route(web::post().to(api_handlers::api_products_create_handler)),
        )
        .route(
          "/products/download_csv/",
          web::get().to(api_handlers::api_products_download_csv_handler),
        )
        .route(
          "/products/upload_csv/",
          web::post().to(api_handlers::api_products_upload_csv_handler),
        )
        .service(
          web::resource("/products/{id}/")
            .route(web::get().to(api_handlers::api_products_retrieve_handler))
            .route(web::put().to(api_handlers::api_products_update_handler))
            .route(web::patch().to(api_handlers::api_products_update_handler))
            .route(web::delete().to(api_handlers::api_products_delete_handler)),
        )
        .service(
          web::resource("/orders/")
            .route(web::get().to(api_handlers::api_orders_list_handler))
            .route(web::post().to(api_handlers::api_orders_create_handler)),
        )
        .service(
          web::resource("/orders/{id}/")
            .route(web::get().to(api_handlers::api_orders_retrieve_handler))
            .route(web::put().to(api_handlers::api_orders_update_handler))
            .route(web::patch().to(api_handlers::api_orders_update_handler))
            .route(web::delete().to(api_handlers::api_orders_delete_handler)),
        ),
    )
    // Blog
    .route("/blog/", web::get().to(blog_handlers::blog_list_handler))
    .route("/blog/{id}/", web::get().to(blog_handlers::blog_detail_handler))
    .route("/latest/feed/", web::get().to(blog_handlers::latest_feed_handler))
    // Request-data playground
    .service(
      web::scope("/req")
        .route("/get/", web::get().to(request_data_handlers::process_get_handler))
        .service(
          web::resource("/bio/")
            .route(web::get().to(request_data_handlers::user_bio_form_handler))
            .route(web::post().to(request_data_handlers::user_bio_submit_handler)),
        )
        .service(
          web::resource("/upload/")
            .route(web::get().to(request_data_handlers::file_upload_form_handler))
            .route(web::post().to(request_data_handlers::file_upload_handler)),
        )
        .route("/error-upload/", web::get().to(request_data_handlers::error_upload_handler))
        .route("/error-request", web::get().to(request_data_handlers::error_request_handler)),
    );
}
