//! `object` step: apply or delete an arbitrary Kubernetes object

use super::{Op, StepContext, StepHandler, StepOutput};
use crate::error::Result;
use async_trait::async_trait;
use bosun_common::{parse_scalar, set_path};
use bosun_crd::ObjectSpec;
use bosun_dynamic::{parse_gvk, ApplyOptions, DeleteOptions, ResourceApplier, ResourceDeleter};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

pub struct ObjectHandler {
    applier: Arc<dyn ResourceApplier>,
    deleter: Arc<dyn ResourceDeleter>,
}

impl ObjectHandler {
    pub fn new(applier: Arc<dyn ResourceApplier>, deleter: Arc<dyn ResourceDeleter>) -> Self {
        Self { applier, deleter }
    }
}

/// Build the full document: typed skeleton plus expanded `set` assignments.
fn render(spec: &ObjectSpec, ctx: &StepContext<'_>, namespace: &str) -> Result<Value> {
    let mut doc = json!({
        "apiVersion": spec.reference.api_version,
        "kind": spec.reference.kind,
        "metadata": {
            "name": spec.reference.metadata.name,
            "namespace": namespace,
        }
    });

    for entry in &spec.set {
        let expanded = ctx.env.expand(&entry.value);
        let value = if entry.as_string == Some(true) {
            Value::String(expanded)
        } else {
            parse_scalar(&expanded)
        };
        set_path(&mut doc, &entry.name, value)?;
    }
    Ok(doc)
}

#[async_trait]
impl StepHandler for ObjectHandler {
    async fn handle(
        &self,
        ctx: &mut StepContext<'_>,
        id: &str,
        payload: &Value,
    ) -> Result<StepOutput> {
        let spec: ObjectSpec = serde_json::from_value(payload.clone())?;

        let namespace = if spec.reference.metadata.namespace.is_empty() {
            ctx.namespace.to_string()
        } else {
            spec.reference.metadata.namespace.clone()
        };
        let gvk = parse_gvk(&spec.reference.api_version, &spec.reference.kind)?;
        let name = spec.reference.metadata.name.clone();

        let operation = if ctx.op == Op::Delete {
            debug!(step = id, kind = %gvk.kind, %namespace, %name, "deleting object");
            self.deleter
                .delete(DeleteOptions {
                    gvk: gvk.clone(),
                    namespace: Some(namespace.clone()),
                    name: name.clone(),
                })
                .await?;
            "delete"
        } else {
            let doc = render(&spec, ctx, &namespace)?;
            debug!(step = id, kind = %gvk.kind, %namespace, %name, "applying object");
            self.applier
                .apply(
                    &doc,
                    ApplyOptions {
                        gvk: gvk.clone(),
                        namespace: Some(namespace.clone()),
                        name: name.clone(),
                    },
                )
                .await?;
            "apply"
        };

        Ok(StepOutput::Object {
            api_version: spec.reference.api_version.clone(),
            kind: gvk.kind,
            namespace,
            name,
            operation: operation.to_string(),
        })
    }
}
