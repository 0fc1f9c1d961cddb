// core/src/pipeline/definition.rs

//! Pipeline structure and step manipulation.

use crate::core::handler::Handler;
use crate::core::step::{SkipCondition, StepDef};
use crate::error::FlowError;
use std::collections::HashMap;

/// An ordered list of named steps over context data `TData`, whose handlers
/// fail with `Err`.
///
/// `Err` must be buildable from [`FlowError`] so that engine failures (for
/// example a required step without handlers) surface through the same type
/// as handler failures.
pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub(crate) steps: Vec<StepDef<TData>>,
  pub(crate) before: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) on: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) after: HashMap<String, Vec<Handler<TData, Err>>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Builds a pipeline from `(name, optional, skip_if)` triples.
  pub fn new(step_defs: &[(&str, bool, Option<SkipCondition<TData>>)]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(name, optional, skip_if)| StepDef::new(*name, *optional, skip_if.clone()))
      .collect();

    Self {
      steps,
      before: HashMap::new(),
      on: HashMap::new(),
      after: HashMap::new(),
    }
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  pub fn has_step(&self, step_name: &str) -> bool {
    self.steps.iter().any(|s| s.name == step_name)
  }

  fn position(&self, step_name: &str) -> Result<usize, FlowError> {
    self
      .steps
      .iter()
      .position(|s| s.name == step_name)
      .ok_or_else(|| FlowError::StepNotFound {
        step_name: step_name.to_string(),
      })
  }

  /// Panics when `step_name` is unknown. Handler registration happens once at
  /// startup, so a typo is a wiring bug rather than a runtime condition.
  pub(crate) fn ensure_step_exists(&self, step_name: &str) {
    if !self.has_step(step_name) {
      panic!("flowline setup error: step '{}' is not defined in this pipeline", step_name);
    }
  }

  pub fn insert_before_step(
    &mut self,
    existing_step: &str,
    new_step: impl Into<String>,
    optional: bool,
    skip_if: Option<SkipCondition<TData>>,
  ) -> Result<(), FlowError> {
    let idx = self.position(existing_step)?;
    let name = new_step.into();
    if self.has_step(&name) {
      return Err(FlowError::Internal(format!("step '{}' already exists", name)));
    }
    self.steps.insert(idx, StepDef::new(name, optional, skip_if));
    Ok(())
  }

  pub fn insert_after_step(
    &mut self,
    existing_step: &str,
    new_step: impl Into<String>,
    optional: bool,
    skip_if: Option<SkipCondition<TData>>,
  ) -> Result<(), FlowError> {
    let idx = self.position(existing_step)?;
    let name = new_step.into();
    if self.has_step(&name) {
      return Err(FlowError::Internal(format!("step '{}' already exists", name)));
    }
    self.steps.insert(idx + 1, StepDef::new(name, optional, skip_if));
    Ok(())
  }

  /// Removes a step and its handlers. Unknown names are ignored.
  pub fn remove_step(&mut self, step_name: &str) {
    self.steps.retain(|s| s.name != step_name);
    self.before.remove(step_name);
    self.on.remove(step_name);
    self.after.remove(step_name);
  }

  pub fn set_optional(&mut self, step_name: &str, optional: bool) -> Result<(), FlowError> {
    let idx = self.position(step_name)?;
    if let Some(step) = self.steps.get_mut(idx) {
      step.optional = optional;
    }
    Ok(())
  }

  pub fn set_skip_condition(
    &mut self,
    step_name: &str,
    skip_if: Option<SkipCondition<TData>>,
  ) -> Result<(), FlowError> {
    let idx = self.position(step_name)?;
    if let Some(step) = self.steps.get_mut(idx) {
      step.skip_if = skip_if;
    }
    Ok(())
  }
}
