// core/tests/registry_tests.rs
mod common;

use common::*;
use flowline::{ContextData, Flowline, Pipeline, PipelineControl, PipelineResult};

#[derive(Clone, Debug, Default)]
struct CartCtx {
  lines: u32,
}

#[derive(Clone, Debug, Default)]
struct RefundCtx {
  refunded_cents: i64,
}

#[tokio::test]
async fn registry_dispatches_by_context_type() {
  setup_tracing();
  let registry = Flowline::<TestError>::new();

  let mut cart = Pipeline::<CartCtx, TestError>::new(&[("add_line", false, None)]);
  cart.on("add_line", |ctx: ContextData<CartCtx>| async move {
    ctx.write().lines += 1;
    Ok::<_, TestError>(PipelineControl::Continue)
  });
  registry.register_pipeline(cart);

  let mut refund = Pipeline::<RefundCtx, TestError>::new(&[("refund", false, None)]);
  refund.on("refund", |ctx: ContextData<RefundCtx>| async move {
    ctx.write().refunded_cents = 6500;
    Ok::<_, TestError>(PipelineControl::Continue)
  });
  registry.register_pipeline(refund);

  assert_eq!(registry.len(), 2);
  assert!(registry.is_registered::<CartCtx>());

  let cart_ctx = ContextData::new(CartCtx::default());
  assert_eq!(registry.run(cart_ctx.clone()).await, Ok(PipelineResult::Completed));
  assert_eq!(cart_ctx.read().lines, 1);

  let refund_ctx = ContextData::new(RefundCtx::default());
  assert_eq!(registry.run(refund_ctx.clone()).await, Ok(PipelineResult::Completed));
  assert_eq!(refund_ctx.read().refunded_cents, 6500);
}

#[tokio::test]
async fn unregistered_context_type_is_an_error() {
  setup_tracing();
  let registry = Flowline::<TestError>::new();

  #[derive(Debug, Default)]
  struct Unknown;

  match registry.run(ContextData::new(Unknown)).await {
    Err(TestError::Flow(s)) => {
      assert!(s.contains("PipelineNotRegistered"));
      assert!(s.contains("Unknown"));
    }
    other => panic!("expected PipelineNotRegistered, got {:?}", other),
  }
}

#[tokio::test]
async fn registering_twice_replaces_the_pipeline() {
  setup_tracing();
  let registry = Flowline::<TestError>::new();

  for increment in [1u32, 10] {
    let mut p = Pipeline::<CartCtx, TestError>::new(&[("add_line", false, None)]);
    p.on("add_line", move |ctx: ContextData<CartCtx>| async move {
      ctx.write().lines += increment;
      Ok::<_, TestError>(PipelineControl::Continue)
    });
    registry.register_pipeline(p);
  }

  let ctx = ContextData::new(CartCtx::default());
  registry.run(ctx.clone()).await.expect("run");
  assert_eq!(ctx.read().lines, 10);
  assert_eq!(registry.len(), 1);
}
