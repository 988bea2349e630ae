//! Chart archive retrieval
//!
//! Three source shapes, picked from the URI alone:
//!
//! - `oci://registry/repo` pulls the chart layer of an OCI artifact
//! - a URL ending in `.tgz` / `.tar.gz` downloads the archive directly
//! - any other `http(s)` URL is a helm repository; its `index.yaml` is
//!   consulted to locate the package

mod http;
mod oci;
mod tgz;

use crate::error::{ChartError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Where and what to fetch
#[derive(Debug, Clone, Default)]
pub struct GetOptions {
    /// Chart source: oci reference, direct archive url, or repository url
    pub uri: String,
    /// Exact version or semver constraint; empty means latest
    pub version: String,
    /// Chart name within a repository; ignored for oci and direct sources
    pub repo: String,
    pub insecure_skip_verify_tls: bool,
    pub username: String,
    pub password: String,
    /// Forward credentials to the chart host, not just the index host
    pub pass_credentials: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scheme {
    Oci,
    Tgz,
    Repo,
}

pub(crate) fn classify(uri: &str) -> Result<Scheme> {
    if uri.starts_with("oci://") {
        return Ok(Scheme::Oci);
    }
    if uri.starts_with("http://") || uri.starts_with("https://") {
        if uri.ends_with(".tgz") || uri.ends_with(".tar.gz") {
            return Ok(Scheme::Tgz);
        }
        return Ok(Scheme::Repo);
    }
    Err(ChartError::UnsupportedScheme(uri.to_string()))
}

/// A fetched chart archive and the concrete location it came from
#[derive(Debug, Clone)]
pub struct ChartArchive {
    pub data: Vec<u8>,
    /// Exact package url or oci reference after version resolution
    pub resolved_url: String,
}

/// Retrieve the chart archive for the given source.
pub async fn get(opts: &GetOptions) -> Result<ChartArchive> {
    let scheme = classify(&opts.uri)?;
    debug!(uri = %opts.uri, version = %opts.version, ?scheme, "fetching chart");

    match scheme {
        Scheme::Oci => oci::fetch(opts).await,
        Scheme::Tgz => tgz::fetch(opts).await,
        Scheme::Repo => http::fetch(opts).await,
    }
}

/// Download `url` with the shared HTTP policy: bounded timeout, optional
/// TLS verification bypass, basic auth only when credentials may travel.
pub(crate) async fn fetch_url(url: &str, opts: &GetOptions, with_auth: bool) -> Result<Vec<u8>> {
    let client = reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .danger_accept_invalid_certs(opts.insecure_skip_verify_tls)
        .build()?;

    let mut req = client.get(url);
    if with_auth && !opts.username.is_empty() {
        req = req.basic_auth(&opts.username, Some(&opts.password));
    }

    let resp = req.send().await?;
    if !resp.status().is_success() {
        return Err(ChartError::FetchStatus {
            url: url.to_string(),
            status: resp.status().as_u16(),
        });
    }
    Ok(resp.bytes().await?.to_vec())
}

/// Seam for the chart step: fetch an archive without caring how.
#[async_trait]
pub trait ChartFetcher: Send + Sync {
    async fn fetch(&self, opts: &GetOptions) -> Result<ChartArchive>;
}

/// Production fetcher dispatching on the URI scheme
#[derive(Debug, Clone, Default)]
pub struct Resolver;

#[async_trait]
impl ChartFetcher for Resolver {
    async fn fetch(&self, opts: &GetOptions) -> Result<ChartArchive> {
        get(opts).await
    }
}
