//! Bosun workflow engine
//!
//! Turns a `WorkflowSpec` into cluster effects: an ordered run of `var`,
//! `object` and `chart` steps sharing one per-run variable environment.
//! Steps are idempotent, so re-running a converged workflow is safe; the
//! controller uses payload digests to skip steps that haven't changed.

pub mod engine;
pub mod error;
pub mod steps;

pub use engine::{first_error, Config, StepResult, Workflow};
pub use error::{Result, StepError};
pub use steps::{
    ChartHandler, ObjectHandler, Op, StepContext, StepHandler, StepOutput, VarHandler,
};
