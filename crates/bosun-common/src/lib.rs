//! Bosun common types and helpers
//!
//! Small leaf crate shared by the step handlers and the workflow engine:
//!
//! - `Environment` - per-run variable store
//! - `expand` - single-pass `$NAME` substitution
//! - `path` - dotted-path get/set over unstructured JSON trees

pub mod env;
pub mod expand;
pub mod path;

pub use env::*;
pub use expand::*;
pub use path::*;
