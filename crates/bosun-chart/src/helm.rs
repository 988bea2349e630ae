//! Helm release management
//!
//! `HelmClient` is the seam the chart step drives; the production
//! implementation shells out to the `helm` binary so release bookkeeping
//! (history, rollbacks, hooks) stays exactly helm's own.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::io::Write;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Error)]
pub enum HelmError {
    #[error("release {0} not found")]
    ReleaseNotFound(String),

    #[error("helm {action} failed: {stderr}")]
    CommandFailed { action: String, stderr: String },

    #[error("failed to run helm: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode helm output: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HelmError>;

/// Values passed to the release, already expanded by the caller
#[derive(Debug, Clone, Default)]
pub struct ValuesOptions {
    /// `--set` entries, typed values
    pub values: Vec<(String, String)>,
    /// `--set-string` entries, forced to strings
    pub string_values: Vec<(String, String)>,
}

/// Everything needed to install or upgrade one release
#[derive(Debug, Clone)]
pub struct InstallSpec {
    pub release_name: String,
    pub namespace: String,
    /// Raw chart archive bytes, already fetched
    pub chart: Vec<u8>,
    /// Source uri, for logging only
    pub chart_url: String,
    pub values: ValuesOptions,
    pub wait: bool,
    pub timeout: Duration,
    pub create_namespace: bool,
    pub max_history: u32,
}

/// Outcome of an install or upgrade
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Release {
    pub name: String,
    #[serde(default)]
    pub chart_name: String,
    #[serde(default)]
    pub chart_version: String,
    #[serde(default)]
    pub app_version: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub revision: u32,
    #[serde(default)]
    pub last_deployed: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait HelmClient: Send + Sync {
    /// Install the release, or upgrade it in place if it already exists.
    async fn install_or_upgrade(&self, spec: &InstallSpec) -> Result<Release>;

    /// Remove the release and its history. Absence is reported as
    /// `ReleaseNotFound`, not swallowed, so callers can decide.
    async fn uninstall(&self, release_name: &str, namespace: &str) -> Result<()>;
}

/// Production client shelling out to the `helm` binary
#[derive(Debug, Clone)]
pub struct CliHelmClient {
    helm_bin: String,
}

impl Default for CliHelmClient {
    fn default() -> Self {
        Self {
            helm_bin: "helm".to_string(),
        }
    }
}

impl CliHelmClient {
    pub fn new(helm_bin: impl Into<String>) -> Self {
        Self {
            helm_bin: helm_bin.into(),
        }
    }

    fn upgrade_args(spec: &InstallSpec, chart_path: &Path) -> Vec<String> {
        let mut args = vec![
            "upgrade".to_string(),
            "--install".to_string(),
            spec.release_name.clone(),
            chart_path.display().to_string(),
            "--namespace".to_string(),
            spec.namespace.clone(),
            "--history-max".to_string(),
            spec.max_history.to_string(),
            "-o".to_string(),
            "json".to_string(),
        ];
        if spec.create_namespace {
            args.push("--create-namespace".to_string());
        }
        if spec.wait {
            args.push("--wait".to_string());
            args.push("--timeout".to_string());
            args.push(format!("{}s", spec.timeout.as_secs()));
        }
        for (k, v) in &spec.values.values {
            args.push("--set".to_string());
            args.push(format!("{k}={v}"));
        }
        for (k, v) in &spec.values.string_values {
            args.push("--set-string".to_string());
            args.push(format!("{k}={v}"));
        }
        args
    }

    async fn run(&self, action: &str, args: &[String]) -> Result<Vec<u8>> {
        debug!(action, "running helm");
        let output = Command::new(&self.helm_bin)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(HelmError::CommandFailed {
                action: action.to_string(),
                stderr,
            });
        }
        Ok(output.stdout)
    }
}

#[async_trait]
impl HelmClient for CliHelmClient {
    async fn install_or_upgrade(&self, spec: &InstallSpec) -> Result<Release> {
        let mut archive = tempfile::Builder::new()
            .prefix(&spec.release_name)
            .suffix(".tgz")
            .tempfile()?;
        archive.write_all(&spec.chart)?;
        archive.flush()?;

        debug!(
            release = %spec.release_name,
            namespace = %spec.namespace,
            chart = %spec.chart_url,
            "installing release"
        );

        let args = Self::upgrade_args(spec, archive.path());
        let stdout = self.run("upgrade", &args).await?;

        let raw: RawRelease = serde_json::from_slice(&stdout)?;
        Ok(raw.into_release())
    }

    async fn uninstall(&self, release_name: &str, namespace: &str) -> Result<()> {
        let args = vec![
            "uninstall".to_string(),
            release_name.to_string(),
            "--namespace".to_string(),
            namespace.to_string(),
        ];
        match self.run("uninstall", &args).await {
            Ok(_) => Ok(()),
            Err(HelmError::CommandFailed { stderr, .. })
                if stderr.contains("release: not found") =>
            {
                Err(HelmError::ReleaseNotFound(release_name.to_string()))
            }
            Err(e) => Err(e),
        }
    }
}

/// Shape of `helm upgrade -o json` output
#[derive(Deserialize)]
struct RawRelease {
    name: String,
    #[serde(default)]
    namespace: String,
    #[serde(default)]
    version: u32,
    #[serde(default)]
    info: RawInfo,
    #[serde(default)]
    chart: RawChart,
}

#[derive(Default, Deserialize)]
struct RawInfo {
    #[serde(default)]
    status: String,
    #[serde(default)]
    last_deployed: Option<DateTime<Utc>>,
}

#[derive(Default, Deserialize)]
struct RawChart {
    #[serde(default)]
    metadata: RawChartMetadata,
}

#[derive(Default, Deserialize)]
struct RawChartMetadata {
    #[serde(default)]
    name: String,
    #[serde(default)]
    version: String,
    #[serde(rename = "appVersion", default)]
    app_version: String,
}

impl RawRelease {
    fn into_release(self) -> Release {
        Release {
            name: self.name,
            chart_name: self.chart.metadata.name,
            chart_version: self.chart.metadata.version,
            app_version: self.chart.metadata.app_version,
            namespace: self.namespace,
            status: self.info.status,
            revision: self.version,
            last_deployed: self.info.last_deployed,
        }
    }
}

/// In-memory stand-in used by tests and dry runs
#[derive(Debug, Clone, Default)]
pub struct NoopHelmClient;

#[async_trait]
impl HelmClient for NoopHelmClient {
    async fn install_or_upgrade(&self, spec: &InstallSpec) -> Result<Release> {
        Ok(Release {
            name: spec.release_name.clone(),
            chart_name: String::new(),
            chart_version: String::new(),
            app_version: String::new(),
            namespace: spec.namespace.clone(),
            status: "deployed".to_string(),
            revision: 1,
            last_deployed: None,
        })
    }

    async fn uninstall(&self, _release_name: &str, _namespace: &str) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn spec() -> InstallSpec {
        InstallSpec {
            release_name: "postgres".to_string(),
            namespace: "db".to_string(),
            chart: vec![1, 2, 3],
            chart_url: "https://charts.example.com/postgres-1.2.0.tgz".to_string(),
            values: ValuesOptions {
                values: vec![("replicas".to_string(), "3".to_string())],
                string_values: vec![("tag".to_string(), "1.28".to_string())],
            },
            wait: true,
            timeout: Duration::from_secs(300),
            create_namespace: true,
            max_history: 10,
        }
    }

    #[test]
    fn test_upgrade_args() {
        let path = PathBuf::from("/tmp/postgres.tgz");
        let args = CliHelmClient::upgrade_args(&spec(), &path);
        let joined = args.join(" ");
        assert!(joined.starts_with("upgrade --install postgres /tmp/postgres.tgz"));
        assert!(joined.contains("--namespace db"));
        assert!(joined.contains("--history-max 10"));
        assert!(joined.contains("--create-namespace"));
        assert!(joined.contains("--wait --timeout 300s"));
        assert!(joined.contains("--set replicas=3"));
        assert!(joined.contains("--set-string tag=1.28"));
        assert!(joined.contains("-o json"));
    }

    #[test]
    fn test_upgrade_args_no_wait() {
        let mut s = spec();
        s.wait = false;
        s.create_namespace = false;
        let args = CliHelmClient::upgrade_args(&s, &PathBuf::from("/tmp/c.tgz"));
        let joined = args.join(" ");
        assert!(!joined.contains("--wait"));
        assert!(!joined.contains("--create-namespace"));
    }

    #[test]
    fn test_parse_release_json() {
        let out = r#"{
            "name": "postgres",
            "namespace": "db",
            "version": 4,
            "info": {"status": "deployed", "last_deployed": "2026-02-10T11:22:33.000000Z"},
            "chart": {"metadata": {"name": "postgres", "version": "1.2.0", "appVersion": "16.1"}}
        }"#;
        let raw: RawRelease = serde_json::from_slice(out.as_bytes()).unwrap();
        let release = raw.into_release();
        assert_eq!(release.name, "postgres");
        assert_eq!(release.revision, 4);
        assert_eq!(release.status, "deployed");
        assert_eq!(release.chart_version, "1.2.0");
        assert_eq!(release.app_version, "16.1");
        assert!(release.last_deployed.is_some());
    }
}
