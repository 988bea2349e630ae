//! `chart` step: install, upgrade or uninstall a helm release

use super::{Op, StepContext, StepHandler, StepOutput};
use crate::error::{Result, StepError};
use async_trait::async_trait;
use bosun_chart::{
    derive_release_name, ChartFetcher, GetOptions, HelmClient, HelmError, InstallSpec, Release,
    ValuesOptions,
};
use bosun_crd::ChartStepSpec;
use bosun_dynamic::{get_secret, ResourceGetter};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(600);

pub struct ChartHandler {
    getter: Arc<dyn ResourceGetter>,
    fetcher: Arc<dyn ChartFetcher>,
    helm: Arc<dyn HelmClient>,
    /// Applied when the step doesn't name its own history limit
    default_max_history: u32,
}

impl ChartHandler {
    pub fn new(
        getter: Arc<dyn ResourceGetter>,
        fetcher: Arc<dyn ChartFetcher>,
        helm: Arc<dyn HelmClient>,
        default_max_history: u32,
    ) -> Self {
        Self {
            getter,
            fetcher,
            helm,
            default_max_history,
        }
    }

    /// Explicit name first, then the archive url basename, then the chart name.
    fn release_name(spec: &ChartStepSpec) -> String {
        if !spec.release_name.is_empty() {
            return spec.release_name.clone();
        }
        if !spec.url.is_empty() {
            return derive_release_name(&spec.url);
        }
        spec.name.clone()
    }

    async fn credentials(
        &self,
        spec: &ChartStepSpec,
        ctx: &StepContext<'_>,
    ) -> Result<(String, String)> {
        let Some(creds) = &spec.credentials else {
            return Ok((String::new(), String::new()));
        };
        let namespace = if creds.password_ref.namespace.is_empty() {
            ctx.namespace
        } else {
            &creds.password_ref.namespace
        };
        let password = get_secret(
            self.getter.as_ref(),
            namespace,
            &creds.password_ref.name,
            &creds.password_ref.key,
        )
        .await?;
        Ok((creds.username.clone(), password))
    }
}

fn wait_timeout(spec: &ChartStepSpec) -> Result<Duration> {
    match &spec.wait_timeout {
        None => Ok(DEFAULT_WAIT_TIMEOUT),
        Some(raw) => humantime::parse_duration(raw).map_err(|source| StepError::InvalidTimeout {
            raw: raw.clone(),
            source,
        }),
    }
}

fn values(spec: &ChartStepSpec, ctx: &StepContext<'_>) -> ValuesOptions {
    let mut out = ValuesOptions::default();
    for entry in &spec.set {
        // An entry with no value sets nothing.
        if entry.value.is_empty() {
            continue;
        }
        let expanded = ctx.env.expand(&entry.value);
        let pair = (entry.name.clone(), expanded);
        if entry.as_string == Some(true) {
            out.string_values.push(pair);
        } else {
            out.values.push(pair);
        }
    }
    out
}

#[async_trait]
impl StepHandler for ChartHandler {
    async fn handle(
        &self,
        ctx: &mut StepContext<'_>,
        id: &str,
        payload: &Value,
    ) -> Result<StepOutput> {
        let spec: ChartStepSpec = serde_json::from_value(payload.clone())?;
        let release = Self::release_name(&spec);
        let namespace = ctx.namespace.to_string();

        if ctx.op == Op::Delete {
            info!(step = id, %release, %namespace, "uninstalling release");
            let status = match self.helm.uninstall(&release, &namespace).await {
                Ok(()) => "uninstalled",
                // Nothing to tear down counts as done.
                Err(HelmError::ReleaseNotFound(_)) => "not_found",
                Err(e) => return Err(e.into()),
            };
            return Ok(StepOutput::Chart {
                release: Release {
                    name: release,
                    chart_name: String::new(),
                    chart_version: String::new(),
                    app_version: String::new(),
                    namespace,
                    status: status.to_string(),
                    revision: 0,
                    last_deployed: None,
                },
                operation: "uninstall".to_string(),
            });
        }

        let (username, password) = self.credentials(&spec, ctx).await?;
        let uri = if spec.url.is_empty() {
            spec.repository.clone()
        } else {
            spec.url.clone()
        };

        debug!(step = id, %uri, chart = %spec.name, version = %spec.version, "fetching chart");
        let archive = self
            .fetcher
            .fetch(&GetOptions {
                uri: uri.clone(),
                version: spec.version.clone(),
                repo: spec.name.clone(),
                insecure_skip_verify_tls: spec.insecure_skip_tls_verify.unwrap_or(false),
                username,
                password,
                pass_credentials: false,
            })
            .await?;

        let install = InstallSpec {
            release_name: release.clone(),
            namespace: namespace.clone(),
            chart: archive.data,
            chart_url: archive.resolved_url,
            values: values(&spec, ctx),
            wait: spec.wait.unwrap_or(true),
            timeout: wait_timeout(&spec)?,
            create_namespace: !spec.skip_create_namespace,
            max_history: spec.max_history.unwrap_or(self.default_max_history),
        };

        info!(step = id, %release, %namespace, "installing release");
        let deployed = self.helm.install_or_upgrade(&install).await?;

        let operation = if deployed.revision <= 1 {
            "install"
        } else {
            "upgrade"
        };
        Ok(StepOutput::Chart {
            release: deployed,
            operation: operation.to_string(),
        })
    }
}
