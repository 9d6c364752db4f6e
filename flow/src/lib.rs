// flow/src/lib.rs

//! flow: small asynchronous step pipelines.
//!
//! A pipeline is an ordered list of named steps run against one shared
//! context (`ContextData<T>`). Each step may carry `before`, `on` and `after`
//! handlers. Handlers can stop the run early, steps can be optional or
//! skipped by a condition, and a type-keyed `Registry` dispatches a context to
//! the pipeline registered for its data type.

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

pub use crate::registry::Registry;
