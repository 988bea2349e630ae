//! Workflow step types
//!
//! A step is one instruction in a workflow: set a variable, apply/delete an
//! arbitrary Kubernetes object, or install/upgrade/uninstall a Helm chart.
//! The `with` payload is opaque at this level; each step handler owns its
//! own decoding.

use crate::digest::digest;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The type tag of a workflow step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepType {
    /// Set a variable in the run environment
    Var,
    /// Apply or delete an arbitrary Kubernetes object
    Object,
    /// Install, upgrade or uninstall a Helm chart
    Chart,
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepType::Var => write!(f, "var"),
            StepType::Object => write!(f, "object"),
            StepType::Chart => write!(f, "chart"),
        }
    }
}

/// One workflow instruction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Unique step identifier within the workflow
    pub id: String,

    /// Step type, selects the handler
    #[serde(rename = "type")]
    pub step_type: StepType,

    /// Opaque payload; its shape depends on `type`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with: Option<serde_json::Value>,
}

impl Step {
    /// Create a new step with the given payload
    pub fn new(id: impl Into<String>, step_type: StepType, with: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            step_type,
            with: Some(with),
        }
    }

    /// Digest of the raw payload bytes.
    ///
    /// A pure function of the payload, independent of `id` and `type`.
    /// Absent or null payloads digest to the empty string so that a freshly
    /// added empty step is always treated as "needs execution" once.
    pub fn digest(&self) -> String {
        match &self.with {
            None => String::new(),
            Some(v) if v.is_null() => String::new(),
            Some(v) => {
                // Value serialization cannot fail.
                let raw = serde_json::to_vec(v).unwrap_or_default();
                digest(&raw)
            }
        }
    }
}
