//! Bosun CRD Types
//!
//! This crate provides CRD-compatible types for declarative workflows.
//!
//! # API Group
//!
//! All types use the `bosun.dev/v1alpha1` API group.
//!
//! # Resources
//!
//! - `Workflow` - An ordered list of typed steps (`var`, `object`, `chart`)
//!   converged against the cluster on every reconciliation.
//!
//! Step payloads are opaque structured documents; each step carries a
//! content-addressed digest used for drift detection and selective re-runs.

pub mod digest;
pub mod error;
pub mod payload;
pub mod step;
pub mod workflow;

pub use digest::*;
pub use error::*;
pub use payload::*;
pub use step::*;
pub use workflow::*;

/// API version for all Bosun CRDs
pub const API_VERSION: &str = "bosun.dev/v1alpha1";

/// API group for all Bosun CRDs
pub const API_GROUP: &str = "bosun.dev";

/// API version string
pub const VERSION: &str = "v1alpha1";

/// Kind of the workflow resource
pub const WORKFLOW_KIND: &str = "Workflow";
