//! Server-side apply of unstructured documents

use crate::api::dynamic_api;
use crate::error::Result;
use async_trait::async_trait;
use kube::api::{Patch, PatchParams};
use kube::core::{DynamicObject, GroupVersionKind};
use kube::Client;
use tracing::debug;

/// Field manager name reported to the API server
const FIELD_MANAGER: &str = "bosun";

/// Coordinates of the object to apply
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    pub gvk: GroupVersionKind,
    pub namespace: Option<String>,
    pub name: String,
}

/// Capability of applying arbitrary objects by GVK
#[async_trait]
pub trait ResourceApplier: Send + Sync {
    /// Server-side apply the full document: creates if absent, updates if
    /// present. Reapplying an identical document is a no-op.
    async fn apply(&self, obj: &serde_json::Value, opts: ApplyOptions) -> Result<()>;
}

/// Kubernetes-backed applier
#[derive(Clone)]
pub struct Applier {
    client: Client,
}

impl Applier {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceApplier for Applier {
    async fn apply(&self, obj: &serde_json::Value, opts: ApplyOptions) -> Result<()> {
        let api = dynamic_api(&self.client, &opts.gvk, opts.namespace.as_deref()).await?;

        debug!(
            kind = %opts.gvk.kind,
            namespace = opts.namespace.as_deref().unwrap_or(""),
            name = %opts.name,
            "applying object"
        );

        let params = PatchParams::apply(FIELD_MANAGER).force();
        let _applied: DynamicObject = api.patch(&opts.name, &params, &Patch::Apply(obj)).await?;
        Ok(())
    }
}

impl std::fmt::Debug for Applier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Applier").finish_non_exhaustive()
    }
}
