//! Step payload shapes
//!
//! These types describe the `with` document of each step type. Field names
//! are a wire contract with the CRD: they must decode the same JSON/YAML the
//! controller receives from the API server.

use serde::{Deserialize, Serialize};

/// A single name/value entry used by object and chart steps.
///
/// `name` is a dotted field path (e.g. `data.msg` or `env[0].value`); the
/// value may reference run variables with `$NAME` tokens.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Data {
    pub name: String,

    #[serde(default)]
    pub value: String,

    /// Force string typing instead of scalar type inference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_string: Option<bool>,
}

/// Name and (optional) namespace of a referenced object
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NamespacedName {
    pub name: String,

    /// Empty means "inherit the workflow's target namespace"
    #[serde(default)]
    pub namespace: String,
}

/// Typed reference to an arbitrary Kubernetes object
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TypedReference {
    pub api_version: String,
    pub kind: String,
    pub metadata: NamespacedName,
}

/// Source of a variable value read from a live cluster object
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValueFromSource {
    #[serde(flatten)]
    pub object: TypedReference,

    /// Dotted/bracket field selector, e.g. `status.loadBalancer.ingress[0].ip`
    #[serde(default)]
    pub selector: String,
}

/// Payload of a `var` step
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VarSpec {
    #[serde(flatten)]
    pub data: Data,

    /// Resolve the value from a cluster object; overwrites `value` when both
    /// are present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_from: Option<ValueFromSource>,
}

/// Payload of an `object` step
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSpec {
    #[serde(flatten)]
    pub reference: TypedReference,

    /// Field assignments merged into the object skeleton
    #[serde(default)]
    pub set: Vec<Data>,
}

/// Reference to one key of a Secret
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SecretKeySelector {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    pub key: String,
}

/// Basic-auth credentials for a chart source
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub username: String,
    pub password_ref: SecretKeySelector,
}

/// Payload of a `chart` step
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartStepSpec {
    /// Helm repository URL (or `oci://` reference); required unless `url` set
    #[serde(default)]
    pub repository: String,

    /// Chart name within the repository
    #[serde(default)]
    pub name: String,

    /// Exact version or semver constraint; empty selects the highest
    #[serde(default)]
    pub version: String,

    /// Direct URL to a chart package (typically `.tgz`); overrides the
    /// repository fields when set
    #[serde(default)]
    pub url: String,

    /// Explicit release name; derived from the chart source when empty
    #[serde(default)]
    pub release_name: String,

    /// Wait for the release to become ready (default true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait: Option<bool>,

    /// How long to wait for readiness, e.g. `"10m"` (default 10 minutes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_timeout: Option<String>,

    /// Don't create the target namespace; it must already exist
    #[serde(default)]
    pub skip_create_namespace: bool,

    /// Helm values, expanded against the run environment
    #[serde(default)]
    pub set: Vec<Data>,

    /// Basic-auth credentials for the chart source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,

    /// Skip TLS certificate checks for the chart download
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure_skip_tls_verify: Option<bool>,

    /// Maximum number of revisions kept per release
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_history: Option<u32>,
}
