// core/src/lib.rs

//! Flowline: asynchronous step pipelines over shared, lockable context data.
//!
//! A [`Pipeline`] is an ordered list of named steps. Each step can carry
//! `before`, `on` and `after` handlers, an optional flag and a skip
//! condition. Handlers receive a cheap clone of the run's [`ContextData`],
//! take short read/write locks on it, and answer with a [`PipelineControl`]
//! telling the pipeline whether to go on or stop.
//!
//! A [`Flowline`] registry keeps one pipeline per context data type, so
//! callers can start a workflow by building its context and calling
//! [`Flowline::run`] without naming the pipeline.

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::handler::Handler;
pub use crate::core::step::{SkipCondition, StepDef};

pub use crate::pipeline::definition::Pipeline;

pub use crate::error::{FlowError, FlowResult};

pub use crate::registry::Flowline;
