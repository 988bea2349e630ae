//! Dynamic object retrieval

use crate::api::dynamic_api;
use crate::error::{DynamicError, Result};
use async_trait::async_trait;
use kube::core::{DynamicObject, GroupVersionKind};
use kube::Client;
use tracing::debug;

/// Coordinates of the object to fetch
#[derive(Debug, Clone)]
pub struct GetOptions {
    pub gvk: GroupVersionKind,
    pub namespace: Option<String>,
    pub name: String,
}

/// Capability of fetching arbitrary objects by GVK
#[async_trait]
pub trait ResourceGetter: Send + Sync {
    /// Fetch one object. `DynamicError::NotFound` signals absence and is an
    /// expected outcome for callers that probe existence.
    async fn get(&self, opts: GetOptions) -> Result<DynamicObject>;
}

/// Kubernetes-backed getter
#[derive(Clone)]
pub struct Getter {
    client: Client,
}

impl Getter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceGetter for Getter {
    async fn get(&self, opts: GetOptions) -> Result<DynamicObject> {
        let api = dynamic_api(&self.client, &opts.gvk, opts.namespace.as_deref()).await?;

        debug!(
            kind = %opts.gvk.kind,
            namespace = opts.namespace.as_deref().unwrap_or(""),
            name = %opts.name,
            "fetching object"
        );

        match api.get(&opts.name).await {
            Ok(obj) => Ok(obj),
            Err(kube::Error::Api(ae)) if ae.code == 404 => Err(DynamicError::NotFound {
                kind: opts.gvk.kind.clone(),
                namespace: opts.namespace.unwrap_or_default(),
                name: opts.name,
            }),
            Err(e) => Err(e.into()),
        }
    }
}

impl std::fmt::Debug for Getter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Getter").finish_non_exhaustive()
    }
}
