//! Workflow execution engine
//!
//! Runs the ordered step list against a fresh environment, dispatching each
//! step to the handler registered for its type. Create/update runs forward;
//! delete runs the same list in reverse so dependents are torn down before
//! their dependencies. The run stops at the first failing step.

use crate::error::StepError;
use crate::steps::{ChartHandler, ObjectHandler, Op, StepContext, StepHandler, StepOutput, VarHandler};
use bosun_chart::{HelmClient, Resolver};
use bosun_common::Environment;
use bosun_crd::{Step, StepType, WorkflowSpec};
use bosun_dynamic::{Applier, Deletor, Getter};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Engine tunables
#[derive(Debug, Clone)]
pub struct Config {
    /// Helm history limit for chart steps that don't set their own
    pub max_helm_history: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_helm_history: 10,
        }
    }
}

/// Outcome of one executed step
#[derive(Debug)]
pub struct StepResult {
    pub id: String,
    /// Digest of the payload that was executed
    pub digest: String,
    pub output: Option<StepOutput>,
    pub error: Option<StepError>,
}

impl StepResult {
    pub fn ok(&self) -> bool {
        self.error.is_none()
    }
}

/// First failing result, if any, with its step id
pub fn first_error(results: &[StepResult]) -> Option<(&str, &StepError)> {
    results
        .iter()
        .find_map(|r| r.error.as_ref().map(|e| (r.id.as_str(), e)))
}

/// A configured workflow executor
pub struct Workflow {
    namespace: String,
    op: Op,
    handlers: HashMap<StepType, Box<dyn StepHandler>>,
}

impl Workflow {
    /// Empty executor; callers register handlers explicitly. Used by tests
    /// and embedders that bring their own handlers.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            op: Op::Create,
            handlers: HashMap::new(),
        }
    }

    /// Executor wired to a live cluster: dynamic client handlers plus the
    /// given helm client, with chart archives fetched by the production
    /// resolver.
    pub fn for_cluster(
        client: kube::Client,
        helm: Arc<dyn HelmClient>,
        namespace: impl Into<String>,
        config: &Config,
    ) -> Self {
        let getter: Arc<Getter> = Arc::new(Getter::new(client.clone()));
        let applier = Arc::new(Applier::new(client.clone()));
        let deleter = Arc::new(Deletor::new(client));

        let mut wf = Self::new(namespace);
        wf.register(StepType::Var, Box::new(VarHandler::new(getter.clone())));
        wf.register(
            StepType::Object,
            Box::new(ObjectHandler::new(applier, deleter)),
        );
        wf.register(
            StepType::Chart,
            Box::new(ChartHandler::new(
                getter,
                Arc::new(Resolver),
                helm,
                config.max_helm_history,
            )),
        );
        wf
    }

    pub fn register(&mut self, step_type: StepType, handler: Box<dyn StepHandler>) {
        self.handlers.insert(step_type, handler);
    }

    pub fn set_op(&mut self, op: Op) {
        self.op = op;
    }

    pub fn op(&self) -> Op {
        self.op
    }

    /// Execute the workflow.
    ///
    /// `skip` filters steps that are already converged; skipped steps produce
    /// no result. Each run starts from an empty environment, so var steps
    /// must never be skipped when later steps depend on them. Execution is
    /// fail-fast: the first error ends the run, and only attempted steps
    /// appear in the result list.
    pub async fn run(
        &self,
        spec: &WorkflowSpec,
        skip: impl Fn(&Step) -> bool,
    ) -> Vec<StepResult> {
        let mut env = Environment::new();
        let mut results = Vec::new();

        let steps: Vec<&Step> = if self.op == Op::Delete {
            spec.steps.iter().rev().collect()
        } else {
            spec.steps.iter().collect()
        };

        for step in steps {
            if skip(step) {
                continue;
            }

            let mut ctx = StepContext {
                env: &mut env,
                namespace: &self.namespace,
                op: self.op,
            };
            let payload = step.with.clone().unwrap_or(serde_json::Value::Null);

            let outcome = match self.handlers.get(&step.step_type) {
                Some(handler) => handler.handle(&mut ctx, &step.id, &payload).await,
                None => Err(StepError::UnknownStepType(step.step_type.to_string())),
            };

            match outcome {
                Ok(output) => {
                    info!(step = %step.id, ty = %step.step_type, "step completed");
                    results.push(StepResult {
                        id: step.id.clone(),
                        digest: step.digest(),
                        output: Some(output),
                        error: None,
                    });
                }
                Err(err) => {
                    warn!(step = %step.id, ty = %step.step_type, error = %err, "step failed");
                    results.push(StepResult {
                        id: step.id.clone(),
                        digest: step.digest(),
                        output: None,
                        error: Some(err),
                    });
                    break;
                }
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    /// Handler that records execution order and optionally fails
    struct Probe {
        seen: Arc<Mutex<Vec<String>>>,
        fail_on: Option<String>,
    }

    #[async_trait]
    impl StepHandler for Probe {
        async fn handle(
            &self,
            ctx: &mut StepContext<'_>,
            id: &str,
            payload: &Value,
        ) -> crate::error::Result<StepOutput> {
            self.seen.lock().unwrap().push(id.to_string());
            if self.fail_on.as_deref() == Some(id) {
                return Err(StepError::UnknownStepType("boom".to_string()));
            }
            // Leave a trace in the environment so cross-step state is visible.
            ctx.env.set(id, payload.to_string());
            Ok(StepOutput::Var {
                name: id.to_string(),
                value: String::new(),
            })
        }
    }

    fn workflow_with_probe(fail_on: Option<&str>) -> (Workflow, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut wf = Workflow::new("demo");
        wf.register(
            StepType::Var,
            Box::new(Probe {
                seen: seen.clone(),
                fail_on: fail_on.map(str::to_string),
            }),
        );
        (wf, seen)
    }

    fn spec(ids: &[&str]) -> WorkflowSpec {
        WorkflowSpec {
            steps: ids
                .iter()
                .map(|id| Step::new(*id, StepType::Var, json!({"name": id})))
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_runs_in_order() {
        let (wf, seen) = workflow_with_probe(None);
        let results = wf.run(&spec(&["a", "b", "c"]), |_| false).await;

        assert_eq!(*seen.lock().unwrap(), ["a", "b", "c"]);
        assert_eq!(results.len(), 3);
        assert!(first_error(&results).is_none());
        assert!(results.iter().all(|r| r.ok() && !r.digest.is_empty()));
    }

    #[tokio::test]
    async fn test_delete_runs_in_reverse() {
        let (mut wf, seen) = workflow_with_probe(None);
        wf.set_op(Op::Delete);
        wf.run(&spec(&["a", "b", "c"]), |_| false).await;

        assert_eq!(*seen.lock().unwrap(), ["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_fail_fast() {
        let (wf, seen) = workflow_with_probe(Some("b"));
        let results = wf.run(&spec(&["a", "b", "c"]), |_| false).await;

        assert_eq!(*seen.lock().unwrap(), ["a", "b"]);
        assert_eq!(results.len(), 2);
        assert!(results[0].ok());
        assert!(!results[1].ok());
        assert!(matches!(
            first_error(&results),
            Some(("b", StepError::UnknownStepType(_)))
        ));
    }

    #[tokio::test]
    async fn test_skip_filters_steps() {
        let (wf, seen) = workflow_with_probe(None);
        let results = wf.run(&spec(&["a", "b", "c"]), |s| s.id == "b").await;

        assert_eq!(*seen.lock().unwrap(), ["a", "c"]);
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_unregistered_type_fails_step() {
        let wf = Workflow::new("demo");
        let results = wf.run(&spec(&["a"]), |_| false).await;

        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0].error,
            Some(StepError::UnknownStepType(_))
        ));
    }
}
