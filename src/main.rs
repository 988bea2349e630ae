//! Bosun operator binary

use clap::Parser;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

mod controller;

#[derive(Parser, Debug)]
#[command(name = "bosun", about = "Workflow operator for Kubernetes", version)]
struct Cli {
    /// Path to the helm binary used for chart steps
    #[arg(long, env = "BOSUN_HELM_BIN", default_value = "helm")]
    helm_bin: String,

    /// Helm revisions kept per release when a step doesn't set its own limit
    #[arg(long, env = "BOSUN_MAX_HELM_HISTORY", default_value_t = 10)]
    max_helm_history: u32,

    /// Seconds between periodic re-reconciliations of converged workflows
    #[arg(long, env = "BOSUN_RESYNC_SECS", default_value_t = 300)]
    resync_secs: u64,

    /// Log filter, e.g. "info,bosun=debug"
    #[arg(long, env = "RUST_LOG", default_value = "info,kube=warn")]
    log: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    registry()
        .with(EnvFilter::new(&cli.log))
        .with(fmt::layer())
        .init();

    controller::run(controller::Settings {
        helm_bin: cli.helm_bin,
        max_helm_history: cli.max_helm_history,
        resync: Duration::from_secs(cli.resync_secs),
    })
    .await
}
