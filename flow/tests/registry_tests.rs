// tests/registry_tests.rs
mod common;

use common::*;
use flow::{ContextData, FlowError, Pipeline, PipelineControl, PipelineResult, Registry};

#[derive(Clone, Debug, Default)]
struct CsvImportDraft {
  rows: Vec<String>,
  imported: usize,
}

#[tokio::test]
async fn dispatches_by_context_type() {
  setup_tracing();
  let registry = Registry::<TestError>::new();

  let mut signup = Pipeline::<AccountDraft, TestError>::new(&[("create_account", false, None)]);
  signup
    .on("create_account", |ctx: ContextData<AccountDraft>| async move {
      ctx.write().account_id = Some(7);
      Ok::<_, FlowError>(PipelineControl::Continue)
    })
    .unwrap();
  registry.register_pipeline(signup);

  let mut import = Pipeline::<CsvImportDraft, TestError>::new(&[("insert_rows", false, None)]);
  import
    .on("insert_rows", |ctx: ContextData<CsvImportDraft>| async move {
      let mut guard = ctx.write();
      guard.imported = guard.rows.len();
      Ok::<_, TestError>(PipelineControl::Continue)
    })
    .unwrap();
  registry.register_pipeline(import);

  assert_eq!(registry.len(), 2);
  assert!(registry.is_registered::<AccountDraft>());

  let account_ctx = ContextData::new(AccountDraft::default());
  assert_eq!(registry.run(account_ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert_eq!(account_ctx.read().account_id, Some(7));

  let import_ctx = ContextData::new(CsvImportDraft {
    rows: vec!["a".into(), "b".into()],
    imported: 0,
  });
  registry.run(import_ctx.clone()).await.unwrap();
  assert_eq!(import_ctx.read().imported, 2);
}

#[tokio::test]
async fn unregistered_context_type_is_an_error() {
  setup_tracing();
  let registry = Registry::<TestError>::new();
  assert!(registry.is_empty());

  let result = registry.run(ContextData::new(CsvImportDraft::default())).await;

  match result {
    Err(TestError::Flow(s)) => {
      assert!(s.contains("PipelineNotRegistered"));
      assert!(s.contains("CsvImportDraft"));
    }
    other => panic!("expected PipelineNotRegistered, got {:?}", other),
  }
}

#[tokio::test]
async fn handler_errors_surface_through_registry() {
  setup_tracing();
  let registry = Registry::<TestError>::new();
  let mut signup = Pipeline::<AccountDraft, TestError>::new(&[("validate", false, None)]);
  signup.on("validate", failing_handler("validate", "password too short")).unwrap();
  registry.register_pipeline(signup);

  let result = registry.run(ContextData::new(AccountDraft::default())).await;

  assert_eq!(result, Err(TestError::Step("password too short".to_string())));
}

#[tokio::test]
async fn later_registration_replaces_earlier_one() {
  setup_tracing();
  let registry = Registry::<TestError>::new();

  let mut first = Pipeline::<AccountDraft, TestError>::new(&[("validate", false, None)]);
  first.on("validate", recording_handler("first")).unwrap();
  registry.register_pipeline(first);

  let mut second = Pipeline::<AccountDraft, TestError>::new(&[("validate", false, None)]);
  second.on("validate", recording_handler("second")).unwrap();
  registry.register_pipeline(second);

  let ctx = ContextData::new(AccountDraft::default());
  registry.run(ctx.clone()).await.unwrap();
  assert_eq!(registry.len(), 1);
  assert_eq!(ctx.read().steps_executed, vec!["second"]);
}
