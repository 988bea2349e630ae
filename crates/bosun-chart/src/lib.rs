//! Bosun chart sourcing and release management
//!
//! Resolves helm chart archives from oci registries, direct archive urls
//! and classic helm repositories, and drives helm releases through the
//! `HelmClient` seam.

pub mod error;
pub mod getter;
pub mod helm;
pub mod repo;
pub mod support;

pub use error::*;
pub use getter::{get, ChartArchive, ChartFetcher, GetOptions, Resolver};
pub use helm::{
    CliHelmClient, HelmClient, HelmError, InstallSpec, NoopHelmClient, Release, ValuesOptions,
};
pub use repo::{ChartVersion, IndexFile};
pub use support::{derive_release_name, derive_repo_name};
