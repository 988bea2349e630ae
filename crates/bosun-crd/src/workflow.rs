//! Workflow spec/status types and drift helpers
//!
//! The status records one `{id, digest, err}` entry per executed step.
//! Drift detection is per-step: comparing recorded digests against the
//! current spec yields exactly the step ids that need re-execution.

use crate::error::{CrdError, Result};
use crate::step::Step;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ordered sequence of workflow steps.
///
/// Order is significant: later steps may read variables set by earlier ones,
/// and the whole list runs in reverse for delete operations.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSpec {
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl WorkflowSpec {
    /// Validate step ids: non-empty and unique within the workflow
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for step in &self.steps {
            if step.id.is_empty() {
                return Err(CrdError::MissingField("steps[].id".to_string()));
            }
            if !seen.insert(step.id.as_str()) {
                return Err(CrdError::DuplicateStepId(step.id.clone()));
            }
        }
        Ok(())
    }
}

/// Per-step record persisted in the resource status
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StepStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Digest recorded after a successful execution; absent means the step
    /// failed or never ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,

    /// Non-empty error marks the step degraded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
}

/// Workflow status as persisted on the custom resource
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStatus {
    #[serde(default)]
    pub steps: HashMap<String, StepStatus>,
}

impl WorkflowStatus {
    /// Recorded digest for a step id, or empty if never applied
    pub fn digest(&self, id: &str) -> &str {
        self.steps
            .get(id)
            .and_then(|s| s.digest.as_deref())
            .unwrap_or("")
    }

    /// Recorded error for a step id, or empty
    pub fn err(&self, id: &str) -> &str {
        self.steps
            .get(id)
            .and_then(|s| s.err.as_deref())
            .unwrap_or("")
    }
}

/// Map of step id to recorded digest, skipping entries with no digest
pub fn current_digest_map(status: &WorkflowStatus) -> HashMap<String, String> {
    let mut got = HashMap::new();
    for step in status.steps.values() {
        let id = step.id.as_deref().unwrap_or("");
        let digest = step.digest.as_deref().unwrap_or("");
        if id.is_empty() || digest.is_empty() {
            continue;
        }
        got.insert(id.to_string(), digest.to_string());
    }
    got
}

/// Step ids whose current payload digest differs from the recorded one.
///
/// Steps with no recorded digest (never applied, or failed last run) are
/// always included. The result preserves spec order.
pub fn steps_to_update(spec: &WorkflowSpec, status: &WorkflowStatus) -> Vec<String> {
    let recorded = current_digest_map(status);

    let mut all = Vec::new();
    for step in &spec.steps {
        let observed = step.digest();
        if let Some(old) = recorded.get(&step.id) {
            if *old == observed {
                continue;
            }
        }
        all.push(step.id.clone());
    }
    all
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::StepType;
    use serde_json::json;

    fn step(id: &str, with: serde_json::Value) -> Step {
        Step::new(id, StepType::Var, with)
    }

    fn recorded(entries: &[(&str, &str)]) -> WorkflowStatus {
        let mut steps = HashMap::new();
        for (id, digest) in entries {
            steps.insert(
                id.to_string(),
                StepStatus {
                    id: Some(id.to_string()),
                    digest: Some(digest.to_string()),
                    err: None,
                },
            );
        }
        WorkflowStatus { steps }
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let spec = WorkflowSpec {
            steps: vec![step("a", json!({})), step("a", json!({}))],
        };
        assert!(matches!(
            spec.validate(),
            Err(CrdError::DuplicateStepId(id)) if id == "a"
        ));
    }

    #[test]
    fn test_validate_rejects_empty_id() {
        let spec = WorkflowSpec {
            steps: vec![step("", json!({}))],
        };
        assert!(matches!(spec.validate(), Err(CrdError::MissingField(_))));
    }

    #[test]
    fn test_steps_to_update_never_applied() {
        let spec = WorkflowSpec {
            steps: vec![step("v1", json!({"value": "a"}))],
        };
        let status = WorkflowStatus::default();

        assert_eq!(steps_to_update(&spec, &status), vec!["v1"]);
    }

    #[test]
    fn test_steps_to_update_selective_rerun() {
        let v1 = step("v1", json!({"value": "a"}));
        let o1_old = step("o1", json!({"kind": "ConfigMap", "rev": 1}));
        let o1_new = step("o1", json!({"kind": "ConfigMap", "rev": 2}));

        // Record digests of the previous spec, then change only o1.
        let status = recorded(&[("v1", &v1.digest()), ("o1", &o1_old.digest())]);
        let spec = WorkflowSpec {
            steps: vec![v1, o1_new],
        };

        assert_eq!(steps_to_update(&spec, &status), vec!["o1"]);
    }

    #[test]
    fn test_steps_to_update_all_current() {
        let v1 = step("v1", json!({"value": "a"}));
        let status = recorded(&[("v1", &v1.digest())]);
        let spec = WorkflowSpec { steps: vec![v1] };

        assert!(steps_to_update(&spec, &status).is_empty());
    }

    #[test]
    fn test_failed_step_has_no_digest_and_retries() {
        // A failed step is recorded with an error and no digest, so the next
        // reconciliation picks it up again.
        let v1 = step("v1", json!({"value": "a"}));
        let mut status = WorkflowStatus::default();
        status.steps.insert(
            "v1".to_string(),
            StepStatus {
                id: Some("v1".to_string()),
                digest: None,
                err: Some("boom".to_string()),
            },
        );

        let spec = WorkflowSpec {
            steps: vec![v1],
        };
        assert_eq!(steps_to_update(&spec, &status), vec!["v1"]);
        assert_eq!(status.err("v1"), "boom");
        assert_eq!(status.digest("v1"), "");
    }

    #[test]
    fn test_status_roundtrip() {
        let status = recorded(&[("a", "deadbeef")]);
        let raw = serde_json::to_value(&status).unwrap();
        assert_eq!(raw["steps"]["a"]["digest"], "deadbeef");

        let back: WorkflowStatus = serde_json::from_value(raw).unwrap();
        assert_eq!(back, status);
    }
}
