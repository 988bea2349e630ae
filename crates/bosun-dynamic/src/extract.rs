//! Field-selector extraction from retrieved objects

use crate::error::Result;
use bosun_common::get_path;
use kube::core::DynamicObject;

/// Read the scalar at `selector` out of a retrieved object.
///
/// The selector navigates the full serialized document, so
/// `metadata.name`, `spec.*` and `status.*` paths all work, e.g.
/// `status.loadBalancer.ingress[0].ip`. Absent segments surface as a
/// selector `NotFound`; traversing through a non-container surfaces as
/// `TypeMismatch`.
pub fn extract(obj: &DynamicObject, selector: &str) -> Result<serde_json::Value> {
    let doc = serde_json::to_value(obj)?;
    let value = get_path(&doc, selector)?;
    Ok(value.clone())
}
