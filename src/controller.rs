//! Workflow controller
//!
//! Watches `Workflow` resources across all namespaces and converges each one
//! through the workflow engine. A finalizer guarantees teardown: the engine
//! runs with the delete operation before the resource is released.

use bosun_chart::{CliHelmClient, HelmClient};
use bosun_crd::{
    steps_to_update, StepStatus, StepType, WorkflowSpec, WorkflowStatus, API_GROUP, VERSION,
    WORKFLOW_KIND,
};
use bosun_workflow::{first_error, Config, Op, StepResult, Workflow};
use futures::StreamExt;
use kube::api::{ApiResource, DynamicObject, GroupVersionKind, Patch, PatchParams};
use kube::runtime::controller::{Action, Controller};
use kube::runtime::finalizer::{finalizer, Event};
use kube::runtime::watcher;
use kube::{Api, Client, ResourceExt};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

const FINALIZER: &str = "workflows.bosun.dev/finalizer";
const ERROR_REQUEUE: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum Error {
    #[error("kube api error: {0}")]
    Kube(#[from] kube::Error),

    #[error("invalid workflow: {0}")]
    Invalid(#[from] bosun_crd::CrdError),

    #[error("failed to decode workflow document: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("step {id} failed: {message}")]
    StepFailed { id: String, message: String },

    #[error("finalizer error: {0}")]
    Finalizer(#[source] Box<kube::runtime::finalizer::Error<Error>>),
}

/// Controller settings, filled from the command line
#[derive(Debug, Clone)]
pub struct Settings {
    pub helm_bin: String,
    pub max_helm_history: u32,
    pub resync: Duration,
}

struct Context {
    client: Client,
    helm: Arc<dyn HelmClient>,
    resource: ApiResource,
    engine_config: Config,
    resync: Duration,
}

fn workflow_resource() -> ApiResource {
    ApiResource::from_gvk_with_plural(
        &GroupVersionKind::gvk(API_GROUP, VERSION, WORKFLOW_KIND),
        "workflows",
    )
}

/// Run the controller until the watch stream ends.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let client = Client::try_default().await?;
    let resource = workflow_resource();
    let api: Api<DynamicObject> = Api::all_with(client.clone(), &resource);

    let ctx = Arc::new(Context {
        client,
        helm: Arc::new(CliHelmClient::new(settings.helm_bin)),
        resource: resource.clone(),
        engine_config: Config {
            max_helm_history: settings.max_helm_history,
        },
        resync: settings.resync,
    });

    info!("starting workflow controller");
    Controller::new_with(api, watcher::Config::default(), resource)
        .run(reconcile, error_policy, ctx)
        .for_each(|res| async move {
            match res {
                Ok((obj, _)) => debug!(name = %obj.name, "reconciled"),
                Err(e) => warn!(error = %e, "reconciliation failed"),
            }
        })
        .await;

    Ok(())
}

async fn reconcile(obj: Arc<DynamicObject>, ctx: Arc<Context>) -> Result<Action, Error> {
    let namespace = obj.namespace().unwrap_or_default();
    let api: Api<DynamicObject> =
        Api::namespaced_with(ctx.client.clone(), &namespace, &ctx.resource);

    finalizer(&api, FINALIZER, obj, |event| async {
        match event {
            Event::Apply(wf) => apply(wf, &ctx).await,
            Event::Cleanup(wf) => cleanup(wf, &ctx).await,
        }
    })
    .await
    .map_err(|e| Error::Finalizer(Box::new(e)))
}

fn parse_spec(obj: &DynamicObject) -> Result<WorkflowSpec, Error> {
    let raw = obj.data.get("spec").cloned().unwrap_or(json!({}));
    let spec: WorkflowSpec = serde_json::from_value(raw)?;
    spec.validate()?;
    Ok(spec)
}

fn parse_status(obj: &DynamicObject) -> WorkflowStatus {
    obj.data
        .get("status")
        .cloned()
        .and_then(|raw| serde_json::from_value(raw).ok())
        .unwrap_or_default()
}

/// Fold run results into the persisted status. Successful steps record their
/// payload digest; failed steps record the error and drop the digest so the
/// next reconciliation retries them.
fn merge_results(status: &mut WorkflowStatus, results: &[StepResult]) {
    for result in results {
        let entry = match &result.error {
            None => StepStatus {
                id: Some(result.id.clone()),
                digest: Some(result.digest.clone()),
                err: None,
            },
            Some(err) => StepStatus {
                id: Some(result.id.clone()),
                digest: None,
                err: Some(err.to_string()),
            },
        };
        status.steps.insert(result.id.clone(), entry);
    }
}

async fn patch_status(
    obj: &DynamicObject,
    ctx: &Context,
    status: &WorkflowStatus,
) -> Result<(), Error> {
    let namespace = obj.namespace().unwrap_or_default();
    let api: Api<DynamicObject> =
        Api::namespaced_with(ctx.client.clone(), &namespace, &ctx.resource);
    api.patch_status(
        &obj.name_any(),
        &PatchParams::default(),
        &Patch::Merge(json!({"status": serde_json::to_value(status)?})),
    )
    .await?;
    Ok(())
}

async fn apply(obj: Arc<DynamicObject>, ctx: &Context) -> Result<Action, Error> {
    let name = obj.name_any();
    let namespace = obj.namespace().unwrap_or_default();

    let spec = parse_spec(&obj)?;
    let mut status = parse_status(&obj);

    let pending = steps_to_update(&spec, &status);
    if pending.is_empty() {
        debug!(%name, %namespace, "workflow converged");
        return Ok(Action::requeue(ctx.resync));
    }

    let op = if status.steps.is_empty() {
        Op::Create
    } else {
        Op::Update
    };
    info!(%name, %namespace, ?op, pending = pending.len(), "running workflow");

    let mut engine = Workflow::for_cluster(
        ctx.client.clone(),
        ctx.helm.clone(),
        namespace.clone(),
        &ctx.engine_config,
    );
    engine.set_op(op);

    // Var steps always run: the environment is rebuilt from scratch each run
    // and later steps may reference variables from converged var steps.
    let skip = |step: &bosun_crd::Step| {
        step.step_type != StepType::Var && !pending.iter().any(|id| *id == step.id)
    };
    let results = engine.run(&spec, skip).await;

    merge_results(&mut status, &results);
    patch_status(&obj, ctx, &status).await?;

    if let Some((id, err)) = first_error(&results) {
        return Err(Error::StepFailed {
            id: id.to_string(),
            message: err.to_string(),
        });
    }

    Ok(Action::requeue(ctx.resync))
}

async fn cleanup(obj: Arc<DynamicObject>, ctx: &Context) -> Result<Action, Error> {
    let name = obj.name_any();
    let namespace = obj.namespace().unwrap_or_default();

    let spec = parse_spec(&obj)?;
    info!(%name, %namespace, "tearing down workflow");

    let mut engine = Workflow::for_cluster(
        ctx.client.clone(),
        ctx.helm.clone(),
        namespace,
        &ctx.engine_config,
    );
    engine.set_op(Op::Delete);

    let results = engine.run(&spec, |_| false).await;
    // The finalizer stays until teardown succeeds.
    if let Some((id, err)) = first_error(&results) {
        return Err(Error::StepFailed {
            id: id.to_string(),
            message: err.to_string(),
        });
    }

    Ok(Action::await_change())
}

fn error_policy(_obj: Arc<DynamicObject>, err: &Error, _ctx: Arc<Context>) -> Action {
    warn!(error = %err, "requeueing after error");
    Action::requeue(ERROR_REQUEUE)
}
