//! `var` step: bind a value into the run environment

use super::{StepContext, StepHandler, StepOutput};
use crate::error::Result;
use async_trait::async_trait;
use bosun_common::strval;
use bosun_crd::VarSpec;
use bosun_dynamic::{extract, parse_gvk, GetOptions, ResourceGetter};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

pub struct VarHandler {
    getter: Arc<dyn ResourceGetter>,
}

impl VarHandler {
    pub fn new(getter: Arc<dyn ResourceGetter>) -> Self {
        Self { getter }
    }
}

#[async_trait]
impl StepHandler for VarHandler {
    async fn handle(
        &self,
        ctx: &mut StepContext<'_>,
        id: &str,
        payload: &Value,
    ) -> Result<StepOutput> {
        let spec: VarSpec = serde_json::from_value(payload.clone())?;

        // A non-empty literal binds first so valueFrom failures never leave
        // the variable unset, and so the literal may itself reference earlier
        // vars. An empty value binds nothing: later `$NAME` references keep
        // passing through verbatim.
        if !spec.data.value.is_empty() {
            let literal = ctx.env.expand(&spec.data.value);
            ctx.env.set(spec.data.name.as_str(), literal);
        }

        if let Some(from) = &spec.value_from {
            let namespace = if from.object.metadata.namespace.is_empty() {
                ctx.namespace
            } else {
                &from.object.metadata.namespace
            };
            let gvk = parse_gvk(&from.object.api_version, &from.object.kind)?;
            let obj = self
                .getter
                .get(GetOptions {
                    gvk,
                    namespace: Some(namespace.to_string()),
                    name: from.object.metadata.name.clone(),
                })
                .await?;
            let value = strval(&extract(&obj, &from.selector)?);
            ctx.env.set(spec.data.name.as_str(), value);
        }

        let value = ctx.env.get(&spec.data.name).unwrap_or_default().to_string();
        debug!(step = id, name = %spec.data.name, "variable bound");

        Ok(StepOutput::Var {
            name: spec.data.name,
            value,
        })
    }
}
