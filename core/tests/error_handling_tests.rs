// core/tests/error_handling_tests.rs
mod common;

use common::*;
use flowline::{ContextData, FlowError, Pipeline, PipelineControl};
use serial_test::serial;

#[tokio::test]
#[serial]
async fn required_step_without_handlers_fails() {
  setup_tracing();
  let p = Pipeline::<TestContext, TestError>::new(&[("persist_orders", false, None)]);
  let result = p.run(ContextData::new(TestContext::default())).await;

  match result {
    Err(TestError::Flow(s)) => {
      assert!(s.contains("HandlerMissing"));
      assert!(s.contains("persist_orders"));
    }
    other => panic!("expected HandlerMissing, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn pipeline_can_use_flow_error_directly() {
  setup_tracing();
  let mut p = Pipeline::<TestContext, FlowError>::new(&[("task", false, None)]);
  p.on("task", |_ctx: ContextData<TestContext>| async move {
    Err::<PipelineControl, _>(FlowError::Internal("boom".to_string()))
  });

  match p.run(ContextData::new(TestContext::default())).await {
    Err(FlowError::Internal(s)) => assert_eq!(s, "boom"),
    other => panic!("expected FlowError::Internal, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn handler_errors_convert_into_pipeline_error() {
  setup_tracing();
  let mut p = Pipeline::<TestContext, TestError>::new(&[("wrapped", false, None)]);
  p.on("wrapped", |_ctx: ContextData<TestContext>| async move {
    Err::<PipelineControl, _>(FlowError::from(anyhow::anyhow!("storage offline")))
  });

  match p.run(ContextData::new(TestContext::default())).await {
    Err(TestError::Flow(s)) => assert!(s.contains("storage offline")),
    other => panic!("expected converted FlowError, got {:?}", other),
  }
}

#[test]
#[should_panic(expected = "not defined")]
fn registering_on_unknown_step_panics() {
  let mut p = Pipeline::<TestContext, TestError>::new(&[("known", false, None)]);
  p.on_handler("unknown", add_amount("unknown", 1));
}
