// tests/context_data_tests.rs
mod common;

use common::*;
use flow::ContextData;

#[test]
fn clones_point_at_the_same_data() {
  let ctx = ContextData::new(AccountDraft::default());
  let other = ctx.clone();
  other.write().username = "bob".to_string();

  assert_eq!(ctx.read().username, "bob");
  assert_eq!(&*ctx.map_read(|d| &d.username), "bob");
}

#[test]
fn snapshot_and_into_inner() {
  let ctx = ContextData::new(AccountDraft {
    username: "alice".to_string(),
    ..Default::default()
  });
  let held = ctx.clone();

  let snap = ctx.snapshot();
  assert_eq!(snap.username, "alice");

  let ctx = ctx.try_into_inner().expect_err("another handle is alive");
  drop(held);
  let inner = ctx.try_into_inner().expect("last handle");
  assert_eq!(inner.username, "alice");
}
