//! Chart resolution errors

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("unsupported chart source scheme in {0}")]
    UnsupportedScheme(String),

    #[error("fetching {url} returned HTTP {status}")]
    FetchStatus { url: String, status: u16 },

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("repository index is empty")]
    EmptyIndex,

    #[error("repository index has no apiVersion")]
    NoApiVersion,

    #[error("failed to parse repository index: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("chart {name} not found in repository index")]
    ChartNotFound { name: String },

    #[error("chart {name} version {version} has no package url")]
    NoPackageUrl { name: String, version: String },

    #[error("invalid url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("no version of {name} satisfies {constraint}")]
    NoVersionMatch { name: String, constraint: String },

    #[error("invalid version constraint {constraint}: {source}")]
    InvalidConstraint {
        constraint: String,
        #[source]
        source: semver::Error,
    },

    #[error("registry {0} reports no tags")]
    NoTags(String),

    #[error("oci registry error: {0}")]
    Oci(#[from] oci_client::errors::OciDistributionError),

    #[error("invalid oci reference: {0}")]
    Reference(#[from] oci_client::ParseError),

    #[error("oci artifact {0} carries no helm chart layer")]
    MissingChartLayer(String),
}
