//! Idempotent deletion of unstructured objects

use crate::api::dynamic_api;
use crate::error::Result;
use async_trait::async_trait;
use kube::api::DeleteParams;
use kube::core::GroupVersionKind;
use kube::Client;
use tracing::debug;

/// Coordinates of the object to delete
#[derive(Debug, Clone)]
pub struct DeleteOptions {
    pub gvk: GroupVersionKind,
    pub namespace: Option<String>,
    pub name: String,
}

/// Capability of deleting arbitrary objects by GVK
#[async_trait]
pub trait ResourceDeleter: Send + Sync {
    /// Delete the object at the given coordinates. Deleting an object that
    /// is already gone is success, not an error.
    async fn delete(&self, opts: DeleteOptions) -> Result<()>;
}

/// Kubernetes-backed deletor
#[derive(Clone)]
pub struct Deletor {
    client: Client,
}

impl Deletor {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceDeleter for Deletor {
    async fn delete(&self, opts: DeleteOptions) -> Result<()> {
        let api = dynamic_api(&self.client, &opts.gvk, opts.namespace.as_deref()).await?;

        debug!(
            kind = %opts.gvk.kind,
            namespace = opts.namespace.as_deref().unwrap_or(""),
            name = %opts.name,
            "deleting object"
        );

        match api.delete(&opts.name, &DeleteParams::default()).await {
            Ok(_) => Ok(()),
            // Idempotent by contract.
            Err(kube::Error::Api(ae)) if ae.code == 404 => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl std::fmt::Debug for Deletor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deletor").finish_non_exhaustive()
    }
}
