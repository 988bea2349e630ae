//! Step handlers
//!
//! One handler per step type. Handlers are pure consumers of the step
//! payload plus the shared run context; all cluster access goes through the
//! trait seams from `bosun-dynamic` and `bosun-chart` so handlers run
//! unchanged against fakes in tests.

pub mod chart;
pub mod object;
pub mod var;

use crate::error::Result;
use async_trait::async_trait;
use bosun_common::Environment;
use serde_json::Value;

pub use chart::ChartHandler;
pub use object::ObjectHandler;
pub use var::VarHandler;

/// What a run is doing to the workflow's effects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// First reconciliation of the resource
    Create,
    /// Subsequent reconciliation
    Update,
    /// Resource is being finalized; effects are torn down in reverse order
    Delete,
}

/// Shared state of one workflow run
pub struct StepContext<'a> {
    /// Variables accumulated by earlier steps of this run
    pub env: &'a mut Environment,
    /// Target namespace for steps that don't name their own
    pub namespace: &'a str,
    pub op: Op,
}

/// What a handler did, for status and logs
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutput {
    Var {
        name: String,
        value: String,
    },
    Object {
        api_version: String,
        kind: String,
        namespace: String,
        name: String,
        operation: String,
    },
    Chart {
        release: bosun_chart::Release,
        operation: String,
    },
}

/// A step handler executes one step payload against the run context.
#[async_trait]
pub trait StepHandler: Send + Sync {
    async fn handle(&self, ctx: &mut StepContext<'_>, id: &str, payload: &Value)
        -> Result<StepOutput>;
}
