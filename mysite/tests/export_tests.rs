// mysite/tests/export_tests.rs

#[macro_use]
mod common;

use actix_web::test;
use mysite::db;
use mysite::db::orders::OrderFields;
use mysite::web::handlers::export_handlers::USER_ORDERS_KEY;
use serde_json::{json, Value};

#[actix_web::test]
async fn products_export_lists_everything_by_id() {
  let state = common::test_state().await;
  let owner = common::create_user(&state, "owner").await;
  let first = common::create_product(&state, &owner, "Zebra", 100).await;
  let second = common::create_product(&state, &owner, "Apple", 250).await;
  db::products::set_archived(&state.db_pool, first.id, true).await.unwrap();
  let app = init_app!(state);

  let req = test::TestRequest::get().uri("/products/export/").to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(
    body,
    json!({
      "products": [
        { "pk": first.id, "name": "Zebra", "price": "1.00", "archived": true },
        { "pk": second.id, "name": "Apple", "price": "2.50", "archived": false },
      ]
    })
  );
}

#[actix_web::test]
async fn products_export_serves_the_snapshot_until_expiry() {
  let state = common::test_state().await;
  let owner = common::create_user(&state, "owner").await;
  common::create_product(&state, &owner, "First", 100).await;
  let app = init_app!(state);

  let req = test::TestRequest::get().uri("/products/export/").to_request();
  let before: Value = test::call_and_read_body_json(&app, req).await;

  common::create_product(&state, &owner, "Second", 200).await;
  let req = test::TestRequest::get().uri("/products/export/").to_request();
  let after: Value = test::call_and_read_body_json(&app, req).await;

  assert_eq!(before, after);
  assert_eq!(after["products"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn orders_export_shape() {
  let state = common::test_state().await;
  let buyer = common::create_user(&state, "buyer").await;
  let fields = OrderFields {
    user_id: buyer.id,
    delivery_address: Some("Main st".to_string()),
    promocode: "P1".to_string(),
  };
  let order = db::orders::insert(&state.db_pool, &fields).await.unwrap();
  let app = init_app!(state);

  let req = test::TestRequest::get().uri("/orders/export/").to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(
    body,
    json!({
      "orders": [
        { "pk": order.id, "delivery_address": "Main st", "promocode": "P1", "created_by": buyer.id },
      ]
    })
  );
}

#[actix_web::test]
async fn user_orders_export_never_short_circuits_on_its_own() {
  let state = common::test_state().await;
  let alice = common::create_user(&state, "alice").await;
  let bob = common::create_user(&state, "bob").await;
  for (owner, promo) in [(&alice, "A"), (&bob, "B")] {
    let fields = OrderFields {
      user_id: owner.id,
      delivery_address: None,
      promocode: promo.to_string(),
    };
    db::orders::insert(&state.db_pool, &fields).await.unwrap();
  }
  let app = init_app!(state);

  let req = test::TestRequest::get()
    .uri(&format!("/users/{}/orders/export/", alice.id))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["orders"][0]["promocode"], "A");

  // The miss stored an empty value, so bob's export is computed fresh.
  assert!(state.cache.get::<Value>(USER_ORDERS_KEY).is_none());
  let req = test::TestRequest::get()
    .uri(&format!("/users/{}/orders/export/", bob.id))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["orders"][0]["promocode"], "B");
}

#[actix_web::test]
async fn user_orders_export_returns_a_value_written_elsewhere() {
  let state = common::test_state().await;
  let alice = common::create_user(&state, "alice").await;
  state
    .cache
    .set(USER_ORDERS_KEY, json!([{ "pk": 42, "delivery_address": null, "promocode": "X" }]), 60)
    .unwrap();
  let app = init_app!(state);

  let req = test::TestRequest::get()
    .uri(&format!("/users/{}/orders/export/", alice.id))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["orders"][0]["pk"], 42);
}
