//! Bosun dynamic resource client
//!
//! GVK-driven access to arbitrary, unknown-at-compile-time Kubernetes
//! resources. Three capabilities, each a thin client over
//! `Api<DynamicObject>` with call-time API discovery:
//!
//! - `Getter` - fetch an object; `NotFound` is a normal, expected outcome
//! - `Applier` - server-side apply of a full unstructured document
//! - `Deletor` - delete; a missing object counts as success
//!
//! `extract` reads a scalar out of a retrieved object via a dotted field
//! selector, and `get_secret` resolves one base64-encoded Secret key.
//!
//! Each capability also exists as a trait (`ResourceGetter` etc.) so step
//! handlers can run against in-memory fakes in tests.

pub mod api;
pub mod applier;
pub mod deletor;
pub mod error;
pub mod extract;
pub mod getter;
pub mod secrets;

pub use api::*;
pub use applier::*;
pub use deletor::*;
pub use error::*;
pub use extract::*;
pub use getter::*;
pub use secrets::*;

pub use kube::core::{DynamicObject, GroupVersionKind};
