// core/src/pipeline/hooks.rs

//! Registration of `before`, `on` and `after` handlers.
//!
//! Handlers may fail with any error convertible into the pipeline's `Err`,
//! which lets an application keep one error enum for all of its pipelines.

use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use crate::core::handler::Handler;
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;
use std::collections::HashMap;
use std::future::Future;

fn boxed<TData, Err, F, E>(
  handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
) -> Handler<TData, Err>
where
  TData: 'static + Send + Sync,
  F: Future<Output = Result<PipelineControl, E>> + Send + 'static,
  E: Into<Err> + Send + Sync + 'static,
  Err: 'static,
{
  Box::new(move |ctx_data| {
    let fut = handler_fn(ctx_data);
    Box::pin(async move { fut.await.map_err(Into::into) })
  })
}

fn push<TData: Send + Sync + 'static, Err>(map: &mut HashMap<String, Vec<Handler<TData, Err>>>, step_name: &str, handler: Handler<TData, Err>) {
  map.entry(step_name.to_string()).or_default().push(handler);
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Adds a handler that runs before the step's `on` handlers.
  pub fn before<F, E>(&mut self, step_name: &str, handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<PipelineControl, E>> + Send + 'static,
    E: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    push(&mut self.before, step_name, boxed(handler_fn));
  }

  /// Adds a main handler for the step. Handlers of one phase run in
  /// registration order.
  pub fn on<F, E>(&mut self, step_name: &str, handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<PipelineControl, E>> + Send + 'static,
    E: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    push(&mut self.on, step_name, boxed(handler_fn));
  }

  /// Adds a handler that runs after the step's `on` handlers.
  pub fn after<F, E>(&mut self, step_name: &str, handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<PipelineControl, E>> + Send + 'static,
    E: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    push(&mut self.after, step_name, boxed(handler_fn));
  }

  /// Registers an already boxed handler, e.g. one built by a shared factory.
  pub fn on_handler(&mut self, step_name: &str, handler: Handler<TData, Err>) {
    self.ensure_step_exists(step_name);
    push(&mut self.on, step_name, handler);
  }
}
