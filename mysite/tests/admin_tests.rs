// mysite/tests/admin_tests.rs

mod common;

use mysite::auth::Permission;
use mysite::db;
use mysite::errors::AppError;
use mysite::services::admin_commands::{self, BUNDLE_DELIVERY_ADDRESS, BUNDLE_PROMOCODE, DEMO_SMARTPHONES};

#[actix_web::test]
async fn create_order_is_get_or_create_with_every_product() {
  let state = common::test_state().await;
  let admin = admin_commands::create_superuser(&state, "admin", "admin@example.com", common::TEST_PASSWORD)
    .await
    .unwrap();
  let products = admin_commands::bulk_create_products(&state, "admin").await.unwrap();
  assert_eq!(products.len(), DEMO_SMARTPHONES.len());

  let (order, created) = admin_commands::create_order(&state, "admin").await.unwrap();
  assert!(created);
  assert_eq!(order.user_id, admin.id);
  assert_eq!(order.delivery_address.as_deref(), Some(BUNDLE_DELIVERY_ADDRESS));
  assert_eq!(order.promocode, BUNDLE_PROMOCODE);
  let expected: Vec<i64> = products.iter().map(|p| p.id).collect();
  assert_eq!(db::orders::product_ids(&state.db_pool, order.id).await.unwrap(), expected);

  let (again, created) = admin_commands::create_order(&state, "admin").await.unwrap();
  assert!(!created);
  assert_eq!(again.id, order.id);
}

#[actix_web::test]
async fn bulk_discount_touches_matching_names_only() {
  let state = common::test_state().await;
  let owner = common::create_user(&state, "owner").await;
  admin_commands::bulk_create_products(&state, "owner").await.unwrap();
  let lamp = common::create_product(&state, &owner, "Lamp", 500).await;

  let updated = admin_commands::bulk_discount(&state, "Smartphone", 10).await.unwrap();
  assert_eq!(updated, 3);
  let lamp = db::products::get_by_id(&state.db_pool, lamp.id).await.unwrap();
  assert_eq!(lamp.discount, 0);
}

#[actix_web::test]
async fn delete_user_with_orders_is_a_conflict() {
  let state = common::test_state().await;
  common::create_user(&state, "buyer").await;
  admin_commands::create_order(&state, "buyer").await.unwrap();

  let err = admin_commands::delete_user(&state, "buyer").await.unwrap_err();
  assert!(matches!(err, AppError::Conflict(_)));
  assert!(db::users::find_by_username(&state.db_pool, "buyer").await.unwrap().is_some());

  common::create_user(&state, "idle").await;
  admin_commands::delete_user(&state, "idle").await.unwrap();
  assert!(db::users::find_by_username(&state.db_pool, "idle").await.unwrap().is_none());
}

#[actix_web::test]
async fn archive_and_unarchive_products() {
  let state = common::test_state().await;
  common::create_user(&state, "owner").await;
  let products = admin_commands::bulk_create_products(&state, "owner").await.unwrap();
  let ids: Vec<i64> = products.iter().map(|p| p.id).collect();

  assert_eq!(admin_commands::set_products_archived(&state, &ids[..2], true).await.unwrap(), 2);
  assert_eq!(db::products::list_active(&state.db_pool).await.unwrap().len(), 1);

  admin_commands::set_products_archived(&state, &ids, false).await.unwrap();
  assert_eq!(db::products::list_active(&state.db_pool).await.unwrap().len(), 3);
}

#[actix_web::test]
async fn group_permissions_reach_members() {
  let state = common::test_state().await;
  let member = common::create_user(&state, "member").await;

  admin_commands::grant_group_permission(&state, "clerks", Permission::ViewOrder).await.unwrap();
  admin_commands::add_to_group(&state, "member", "clerks").await.unwrap();

  let codenames = db::users::permission_codenames(&state.db_pool, member.id).await.unwrap();
  assert!(codenames.contains(Permission::ViewOrder.codename()));
}

#[actix_web::test]
async fn csv_export_and_import_through_commands() {
  let state = common::test_state().await;
  common::create_user(&state, "owner").await;
  admin_commands::bulk_create_products(&state, "owner").await.unwrap();

  let csv = admin_commands::export_products_csv(&state).await.unwrap();
  let imported = admin_commands::import_products_csv(&state, "owner", csv).await.unwrap();
  let names: Vec<&str> = imported.iter().map(|p| p.name.as_str()).collect();
  assert_eq!(names, vec!["Smartphone 1", "Smartphone 2", "Smartphone 3"]);
  assert_eq!(imported[0].price.to_string(), "199.00");
}

#[actix_web::test]
async fn blog_taxonomy_names_are_length_checked() {
  let state = common::test_state().await;

  admin_commands::add_category(&state, "News").await.unwrap();
  assert!(matches!(
    admin_commands::add_category(&state, &"c".repeat(41)).await,
    Err(AppError::Validation(_))
  ));
  assert!(matches!(
    admin_commands::add_tag(&state, &"t".repeat(21)).await,
    Err(AppError::Validation(_))
  ));
  let author = admin_commands::add_author(&state, "Ann", Some("Writes things")).await.unwrap();
  assert_eq!(author.bio.as_deref(), Some("Writes things"));
}

#[actix_web::test]
async fn seed_needs_a_superuser_and_runs_once() {
  let state = common::test_state().await;
  admin_commands::seed_demo_data(&state).await.unwrap();
  assert!(db::products::list_all(&state.db_pool).await.unwrap().is_empty());

  admin_commands::create_superuser(&state, "root", "", common::TEST_PASSWORD).await.unwrap();
  admin_commands::seed_demo_data(&state).await.unwrap();
  admin_commands::seed_demo_data(&state).await.unwrap();
  assert_eq!(db::products::list_all(&state.db_pool).await.unwrap().len(), 3);
}
