// tests/common/mod.rs
#![allow(dead_code)]

use flow::{ContextData, FlowError, Handler, PipelineControl};
use once_cell::sync::Lazy;
use tracing::Level;

/// Stand-in for an account sign-up draft moving through a pipeline.
#[derive(Clone, Debug, Default)]
pub struct AccountDraft {
  pub username: String,
  pub account_id: Option<i64>,
  pub profile_created: bool,
  pub session_token: Option<String>,
  pub steps_executed: Vec<String>,
  pub stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("flow error: {0}")]
  Flow(String),

  #[error("step failed: {0}")]
  Step(String),
}

impl From<FlowError> for TestError {
  fn from(fe: FlowError) -> Self {
    TestError::Flow(format!("{:?}", fe))
  }
}

/// Records its own name in `steps_executed` and stops if `stop_at` names it.
pub fn recording_handler(label: &'static str) -> Handler<AccountDraft, TestError> {
  Box::new(move |ctx: ContextData<AccountDraft>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.steps_executed.push(label.to_string());
      if guard.stop_at.as_deref() == Some(label) {
        return Ok::<_, TestError>(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  })
}

pub fn failing_handler(label: &'static str, message: &'static str) -> Handler<AccountDraft, TestError> {
  Box::new(move |ctx: ContextData<AccountDraft>| {
    Box::pin(async move {
      ctx.write().steps_executed.push(label.to_string());
      Err::<PipelineControl, _>(TestError::Step(message.to_string()))
    })
  })
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
