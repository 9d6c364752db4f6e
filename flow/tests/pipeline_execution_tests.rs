// tests/pipeline_execution_tests.rs
mod common;

use common::*;
use flow::{ContextData, FlowError, Pipeline, PipelineControl, PipelineResult, SkipCondition};
use serial_test::serial;
use std::sync::Arc;

fn signup_steps() -> Pipeline<AccountDraft, TestError> {
  Pipeline::<AccountDraft, TestError>::new(&[
    ("validate", false, None),
    ("create_account", false, None),
    ("create_profile", false, None),
    ("open_session", false, None),
  ])
}

#[tokio::test]
#[serial]
async fn runs_steps_in_declared_order() {
  setup_tracing();
  let mut pipeline = signup_steps();
  for step in ["validate", "create_account", "create_profile", "open_session"] {
    pipeline.on(step, recording_handler(step)).unwrap();
  }

  let ctx = ContextData::new(AccountDraft::default());
  let result = pipeline.run(ctx.clone()).await.unwrap();

  assert_eq!(result, PipelineResult::Completed);
  assert_eq!(
    ctx.read().steps_executed,
    vec!["validate", "create_account", "create_profile", "open_session"]
  );
}

#[tokio::test]
#[serial]
async fn handlers_share_one_context() {
  setup_tracing();
  let mut pipeline = Pipeline::<AccountDraft, TestError>::new(&[("create_account", false, None), ("open_session", false, None)]);

  pipeline
    .on("create_account", |ctx: ContextData<AccountDraft>| async move {
      ctx.write().account_id = Some(42);
      Ok::<_, TestError>(PipelineControl::Continue)
    })
    .unwrap();
  pipeline
    .on("open_session", |ctx: ContextData<AccountDraft>| async move {
      let account_id = { ctx.read().account_id };
      tokio::task::yield_now().await;
      ctx.write().session_token = account_id.map(|id| format!("token-{}", id));
      Ok::<_, TestError>(PipelineControl::Continue)
    })
    .unwrap();

  let ctx = ContextData::new(AccountDraft::default());
  pipeline.run(ctx.clone()).await.unwrap();

  assert_eq!(ctx.read().session_token.as_deref(), Some("token-42"));
}

#[tokio::test]
#[serial]
async fn stop_halts_remaining_steps() {
  setup_tracing();
  let mut pipeline = signup_steps();
  for step in ["validate", "create_account", "create_profile", "open_session"] {
    pipeline.on(step, recording_handler(step)).unwrap();
  }

  let ctx = ContextData::new(AccountDraft {
    stop_at: Some("create_account".to_string()),
    ..Default::default()
  });
  let result = pipeline.run(ctx.clone()).await.unwrap();

  assert_eq!(result, PipelineResult::Stopped);
  assert_eq!(ctx.read().steps_executed, vec!["validate", "create_account"]);
}

#[tokio::test]
#[serial]
async fn failing_step_prevents_later_steps() {
  setup_tracing();
  let mut pipeline = signup_steps();
  pipeline.on("validate", failing_handler("validate", "username taken")).unwrap();
  pipeline.on("create_account", recording_handler("create_account")).unwrap();
  pipeline.on("create_profile", recording_handler("create_profile")).unwrap();
  pipeline.on("open_session", recording_handler("open_session")).unwrap();

  let ctx = ContextData::new(AccountDraft::default());
  let err = pipeline.run(ctx.clone()).await.unwrap_err();

  assert_eq!(err, TestError::Step("username taken".to_string()));
  assert_eq!(ctx.read().steps_executed, vec!["validate"]);
}

#[tokio::test]
#[serial]
async fn skip_condition_is_evaluated_against_current_context() {
  setup_tracing();
  let already_has_profile: SkipCondition<AccountDraft> = Arc::new(|ctx: &ContextData<AccountDraft>| ctx.read().profile_created);
  let mut pipeline = Pipeline::<AccountDraft, TestError>::new(&[
    ("create_account", false, None),
    ("create_profile", false, Some(already_has_profile)),
  ]);
  pipeline
    .on("create_account", |ctx: ContextData<AccountDraft>| async move {
      let mut guard = ctx.write();
      guard.steps_executed.push("create_account".to_string());
      guard.profile_created = true;
      Ok::<_, TestError>(PipelineControl::Continue)
    })
    .unwrap();
  pipeline.on("create_profile", recording_handler("create_profile")).unwrap();

  let ctx = ContextData::new(AccountDraft::default());
  assert_eq!(pipeline.run(ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert_eq!(ctx.read().steps_executed, vec!["create_account"]);
}

#[tokio::test]
#[serial]
async fn required_step_without_handlers_fails() {
  setup_tracing();
  let pipeline = Pipeline::<AccountDraft, TestError>::new(&[("open_session", false, None)]);

  let err = pipeline.run(ContextData::new(AccountDraft::default())).await.unwrap_err();

  match err {
    TestError::Flow(s) => {
      assert!(s.contains("HandlerMissing"));
      assert!(s.contains("open_session"));
    }
    other => panic!("expected HandlerMissing, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn optional_step_without_handlers_is_skipped() {
  setup_tracing();
  let mut pipeline = Pipeline::<AccountDraft, TestError>::new(&[("send_welcome", true, None), ("validate", false, None)]);
  pipeline.on("validate", recording_handler("validate")).unwrap();

  let ctx = ContextData::new(AccountDraft::default());
  assert_eq!(pipeline.run(ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert_eq!(ctx.read().steps_executed, vec!["validate"]);
}

#[tokio::test]
#[serial]
async fn before_on_after_run_in_phase_order() {
  setup_tracing();
  let mut pipeline = Pipeline::<AccountDraft, TestError>::new(&[("create_account", false, None)]);
  pipeline.after("create_account", recording_handler("after")).unwrap();
  pipeline.on("create_account", recording_handler("on")).unwrap();
  pipeline.before("create_account", recording_handler("before")).unwrap();

  let ctx = ContextData::new(AccountDraft::default());
  pipeline.run(ctx.clone()).await.unwrap();

  assert_eq!(ctx.read().steps_executed, vec!["before", "on", "after"]);
}

#[tokio::test]
#[serial]
async fn structural_edits_keep_handlers_consistent() {
  setup_tracing();
  let mut pipeline = signup_steps();
  pipeline
    .insert_after_step("create_profile", "send_welcome", true, None)
    .unwrap();
  pipeline.insert_before_step("validate", "normalize", false, None).unwrap();
  pipeline.on("create_profile", recording_handler("create_profile")).unwrap();
  pipeline.remove_step("create_profile");

  assert_eq!(
    pipeline.step_names(),
    vec!["normalize", "validate", "create_account", "send_welcome", "open_session"]
  );

  let unknown = pipeline.on("create_profile", recording_handler("create_profile"));
  assert!(matches!(unknown, Err(FlowError::StepNotFound { .. })));

  let duplicate = pipeline.insert_after_step("validate", "open_session", false, None);
  assert!(matches!(duplicate, Err(FlowError::Internal(_))));

  pipeline.set_optional("open_session", true).unwrap();
  assert!(pipeline.set_optional("missing", true).is_err());
}
