// core/tests/common/mod.rs
#![allow(dead_code)]

use flowline::{ContextData, FlowError, PipelineControl};
use once_cell::sync::Lazy;
use tracing::Level;

/// Context shaped like a small order workflow: a running total and a trail
/// of executed steps.
#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub total_cents: i64,
  pub trail: Vec<String>,
  pub stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("flowline error: {0}")]
  Flow(String),

  #[error("step failed: {0}")]
  Step(String),
}

impl From<FlowError> for TestError {
  fn from(e: FlowError) -> Self {
    TestError::Flow(format!("{:?}", e))
  }
}

/// Handler that adds `amount_cents` to the total and records `step_name`.
pub fn add_amount(step_name: &'static str, amount_cents: i64) -> flowline::Handler<TestContext, TestError> {
  Box::new(move |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.total_cents += amount_cents;
      guard.trail.push(step_name.to_string());
      if guard.stop_at.as_deref() == Some(step_name) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  })
}

pub fn failing(step_name: &'static str, message: &'static str) -> flowline::Handler<TestContext, TestError> {
  Box::new(move |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      ctx.write().trail.push(step_name.to_string());
      Err(TestError::Step(message.to_string()))
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
