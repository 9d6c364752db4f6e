// mysite/tests/request_data_tests.rs

#[macro_use]
mod common;

use actix_web::http::{header, StatusCode};
use actix_web::test;
use mysite::services::uploads::MAX_UPLOAD_BYTES;
use serde_json::Value;

#[actix_web::test]
async fn get_params_are_concatenated() {
  let state = common::test_state().await;
  let app = init_app!(state);

  let req = test::TestRequest::get().uri("/req/get/?a=foo&b=bar").to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["result"], "foobar");
}

#[actix_web::test]
async fn bio_form_requires_every_field() {
  let state = common::test_state().await;
  let app = init_app!(state);

  let req = test::TestRequest::post()
    .uri("/req/bio/")
    .set_form([("name", "Ann")])
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert!(body["errors"]["age"].is_array());
  assert!(body["errors"]["bio"].is_array());

  let req = test::TestRequest::post()
    .uri("/req/bio/")
    .set_form([("name", "Ann"), ("age", "30"), ("bio", "Hi")])
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn upload_stores_file_and_renames_on_collision() {
  let state = common::test_state().await;
  let app = init_app!(state);

  let mut saved = Vec::new();
  for _ in 0..2 {
    let (content_type, body) = common::multipart_body("myfile", "notes.txt", b"hello");
    let req = test::TestRequest::post()
      .uri("/req/upload/")
      .insert_header((header::CONTENT_TYPE, content_type))
      .set_payload(body)
      .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    saved.push(body["saved_as"].as_str().unwrap().to_string());
  }

  assert_eq!(saved[0], "notes.txt");
  assert_ne!(saved[0], saved[1]);
  assert!(saved[1].starts_with("notes_") && saved[1].ends_with(".txt"));
  assert!(state.config.media_root.join(&saved[1]).exists());
}

#[actix_web::test]
async fn upload_rejects_virus_names() {
  let state = common::test_state().await;
  let app = init_app!(state);

  let (content_type, body) = common::multipart_body("myfile", "virus.exe", b"boom");
  let req = test::TestRequest::post()
    .uri("/req/upload/")
    .insert_header((header::CONTENT_TYPE, content_type))
    .set_payload(body)
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
  assert!(!state.config.media_root.join("virus.exe").exists());
}

#[actix_web::test]
async fn upload_rejects_and_removes_oversized_files() {
  let state = common::test_state().await;
  let app = init_app!(state);

  let data = vec![b'x'; MAX_UPLOAD_BYTES as usize + 1];
  let (content_type, body) = common::multipart_body("myfile", "big.bin", &data);
  let req = test::TestRequest::post()
    .uri("/req/upload/")
    .insert_header((header::CONTENT_TYPE, content_type))
    .set_payload(body)
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
  assert!(!state.config.media_root.join("big.bin").exists());
}

#[actix_web::test]
async fn upload_far_past_the_limit_leaves_nothing_behind() {
  let state = common::test_state().await;
  let app = init_app!(state);

  let data = vec![b'x'; 4 * MAX_UPLOAD_BYTES as usize];
  let (content_type, body) = common::multipart_body("myfile", "huge.bin", &data);
  let req = test::TestRequest::post()
    .uri("/req/upload/")
    .insert_header((header::CONTENT_TYPE, content_type))
    .set_payload(body)
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert!(body["error"].as_str().unwrap_or_default().contains("too large"));
  assert!(!state.config.media_root.join("huge.bin").exists());
}

#[actix_web::test]
async fn upload_skips_other_fields_and_requires_the_named_one() {
  let state = common::test_state().await;
  let app = init_app!(state);

  let (content_type, body) = common::multipart_body("other", "notes.txt", b"hello");
  let req = test::TestRequest::post()
    .uri("/req/upload/")
    .insert_header((header::CONTENT_TYPE, content_type))
    .set_payload(body)
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
  assert!(!state.config.media_root.join("notes.txt").exists());
}
