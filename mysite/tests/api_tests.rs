// mysite/tests/api_tests.rs

#[macro_use]
mod common;

use actix_web::http::{header, StatusCode};
use actix_web::test;
use mysite::db;
use mysite::db::orders::OrderFields;
use mysite::services::uploads::MAX_UPLOAD_BYTES;
use serde_json::{json, Value};

fn names(body: &Value) -> Vec<String> {
  body
    .as_array()
    .expect("array body")
    .iter()
    .filter_map(|p| p["name"].as_str().map(str::to_string))
    .collect()
}

#[actix_web::test]
async fn product_search_filter_and_ordering() {
  let state = common::test_state().await;
  let owner = common::create_user(&state, "owner").await;
  common::create_product(&state, &owner, "Red Phone", 30000).await;
  common::create_product(&state, &owner, "Blue Phone", 20000).await;
  common::create_product(&state, &owner, "Red Chair", 10000).await;
  let app = init_app!(state);

  let req = test::TestRequest::get().uri("/api/products/").to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(names(&body), vec!["Blue Phone", "Red Chair", "Red Phone"]);

  let req = test::TestRequest::get().uri("/api/products/?search=red,phone").to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(names(&body), vec!["Red Phone"]);

  let req = test::TestRequest::get().uri("/api/products/?ordering=-price").to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(names(&body), vec!["Red Phone", "Blue Phone", "Red Chair"]);

  let req = test::TestRequest::get().uri("/api/products/?price=100.00").to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(names(&body), vec!["Red Chair"]);
}

#[actix_web::test]
async fn product_list_rejects_bad_filter_values() {
  let state = common::test_state().await;
  let app = init_app!(state);

  let req = test::TestRequest::get().uri("/api/products/?archived=sometimes").to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

  let req = test::TestRequest::get()
    .uri("/api/products/?price=79228162514264337593543950335")
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn product_create_rejects_a_price_beyond_decimal_range() {
  let state = common::test_state().await;
  let user = common::create_user(&state, "writer").await;
  let cookie = common::login_cookie(&state, &user).await;
  let app = init_app!(state);

  let req = test::TestRequest::post()
    .uri("/api/products/")
    .cookie(cookie)
    .set_json(json!({ "name": "Desk", "price": "79228162514264337593543950335" }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
  assert!(db::products::list_all(&state.db_pool).await.unwrap().is_empty());
}

#[actix_web::test]
async fn anonymous_writes_get_403() {
  let state = common::test_state().await;
  let owner = common::create_user(&state, "owner").await;
  let product = common::create_product(&state, &owner, "Lamp", 1000).await;
  let app = init_app!(state);

  let req = test::TestRequest::post()
    .uri("/api/products/")
    .set_json(json!({ "name": "Desk", "price": "10.00" }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

  let req = test::TestRequest::delete()
    .uri(&format!("/api/products/{}/", product.id))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn product_create_patch_and_delete() {
  let state = common::test_state().await;
  let user = common::create_user(&state, "writer").await;
  let cookie = common::login_cookie(&state, &user).await;
  let app = init_app!(state);

  let req = test::TestRequest::post()
    .uri("/api/products/")
    .cookie(cookie.clone())
    .set_json(json!({ "name": "Desk", "price": "120.50", "description": "Oak" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let created: Value = test::read_body_json(resp).await;
  let id = created["pk"].as_i64().unwrap();
  assert_eq!(created["price"], "120.50");
  assert_eq!(created["created_by"], user.id);

  let req = test::TestRequest::patch()
    .uri(&format!("/api/products/{}/", id))
    .cookie(cookie.clone())
    .set_json(json!({ "discount": 10 }))
    .to_request();
  let patched: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(patched["discount"], 10);
  assert_eq!(patched["name"], "Desk");

  let req = test::TestRequest::delete()
    .uri(&format!("/api/products/{}/", id))
    .cookie(cookie)
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

  let row = db::products::get_by_id(&state.db_pool, id).await.unwrap();
  assert!(row.archived);
}

#[actix_web::test]
async fn csv_download_then_upload_round_trip() {
  let state = common::test_state().await;
  let user = common::create_user(&state, "importer").await;
  common::create_product(&state, &user, "Kettle", 2599).await;
  let cookie = common::login_cookie(&state, &user).await;
  let app = init_app!(state);

  let req = test::TestRequest::get().uri("/api/products/download_csv/").to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let disposition = resp
    .headers()
    .get(header::CONTENT_DISPOSITION)
    .and_then(|v| v.to_str().ok())
    .unwrap_or_default()
    .to_string();
  assert_eq!(disposition, "attachment; filename=products-export.csv");
  let csv = test::read_body(resp).await;
  let text = String::from_utf8_lossy(&csv).to_string();
  assert!(text.starts_with("name,description,price,discount"));
  assert!(text.contains("Kettle"));

  let (content_type, body) = common::multipart_body("file", "products.csv", &csv);
  let req = test::TestRequest::post()
    .uri("/api/products/upload_csv/")
    .cookie(cookie)
    .insert_header((header::CONTENT_TYPE, content_type))
    .set_payload(body)
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let imported: Value = test::read_body_json(resp).await;
  assert_eq!(names(&imported), vec!["Kettle"]);
  assert_eq!(imported[0]["price"], "25.99");

  // No duplicate detection: the catalogue now holds two kettles.
  assert_eq!(db::products::list_all(&state.db_pool).await.unwrap().len(), 2);
}

#[actix_web::test]
async fn csv_upload_with_bad_row_imports_nothing() {
  let state = common::test_state().await;
  let user = common::create_user(&state, "importer").await;
  let cookie = common::login_cookie(&state, &user).await;
  let app = init_app!(state);

  let csv = b"name,price\nGood,1.00\nBad,not-a-price\n";
  let (content_type, body) = common::multipart_body("file", "products.csv", csv);
  let req = test::TestRequest::post()
    .uri("/api/products/upload_csv/")
    .cookie(cookie)
    .insert_header((header::CONTENT_TYPE, content_type))
    .set_payload(body)
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
  assert!(db::products::list_all(&state.db_pool).await.unwrap().is_empty());
}

#[actix_web::test]
async fn orders_api_lists_filters_and_creates() {
  let state = common::test_state().await;
  let alice = common::create_user(&state, "alice").await;
  let bob = common::create_user(&state, "bob").await;
  let product = common::create_product(&state, &alice, "Pen", 100).await;
  for (owner, promo) in [(&alice, "A1"), (&bob, "B1")] {
    let fields = OrderFields {
      user_id: owner.id,
      delivery_address: Some(format!("{} street", owner.username)),
      promocode: promo.to_string(),
    };
    db::orders::insert(&state.db_pool, &fields).await.unwrap();
  }
  let cookie = common::login_cookie(&state, &alice).await;
  let app = init_app!(state);

  let req = test::TestRequest::get()
    .uri(&format!("/api/orders/?user={}", bob.id))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  let orders = body.as_array().unwrap();
  assert_eq!(orders.len(), 1);
  assert_eq!(orders[0]["promocode"], "B1");

  let req = test::TestRequest::get().uri("/api/orders/?ordering=-pk").to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body[0]["promocode"], "B1");

  let req = test::TestRequest::post()
    .uri("/api/orders/")
    .cookie(cookie)
    .set_json(json!({ "user": alice.id, "promocode": "NEW", "products": [product.id] }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let created: Value = test::read_body_json(resp).await;
  assert_eq!(created["products"], json!([product.id]));
  assert_eq!(created["user"], alice.id);
}

#[actix_web::test]
async fn order_update_rolls_back_fields_when_products_fail() {
  let state = common::test_state().await;
  let alice = common::create_user(&state, "alice").await;
  let product = common::create_product(&state, &alice, "Pen", 100).await;
  let fields = OrderFields {
    user_id: alice.id,
    delivery_address: None,
    promocode: "OLD".to_string(),
  };
  let order = db::orders::insert(&state.db_pool, &fields).await.unwrap();
  let cookie = common::login_cookie(&state, &alice).await;
  let app = init_app!(state);

  let req = test::TestRequest::patch()
    .uri(&format!("/api/orders/{}/", order.id))
    .cookie(cookie.clone())
    .set_json(json!({ "promocode": "NEW", "products": [999_999] }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);
  let stored = db::orders::get_by_id(&state.db_pool, order.id).await.unwrap();
  assert_eq!(stored.promocode, "OLD");

  let req = test::TestRequest::patch()
    .uri(&format!("/api/orders/{}/", order.id))
    .cookie(cookie)
    .set_json(json!({ "promocode": "NEW", "products": [product.id] }))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["promocode"], "NEW");
  assert_eq!(body["products"], json!([product.id]));
}

#[actix_web::test]
async fn csv_upload_over_the_size_limit_is_refused() {
  let state = common::test_state().await;
  let user = common::create_user(&state, "importer").await;
  let cookie = common::login_cookie(&state, &user).await;
  let app = init_app!(state);

  let mut csv = b"name,description,price,discount\n".to_vec();
  while (csv.len() as u64) <= MAX_UPLOAD_BYTES {
    csv.extend_from_slice(b"Kettle,Steel,25.99,0\n");
  }
  let (content_type, body) = common::multipart_body("file", "products.csv", &csv);
  let req = test::TestRequest::post()
    .uri("/api/products/upload_csv/")
    .cookie(cookie)
    .insert_header((header::CONTENT_TYPE, content_type))
    .set_payload(body)
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
  assert!(db::products::list_all(&state.db_pool).await.unwrap().is_empty());
}
