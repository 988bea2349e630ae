//! Call-time API resolution for arbitrary GVKs
//!
//! Step payloads name resources by `apiVersion`/`kind` only; the concrete
//! REST mapping (plural, scope) is discovered from the API server when the
//! call is made.

use crate::error::{DynamicError, Result};
use kube::api::Api;
use kube::core::{DynamicObject, GroupVersionKind};
use kube::discovery::{self, Scope};
use kube::Client;

/// Parse an `apiVersion` string into a GVK with the given kind.
///
/// Accepts `group/version` and the core group's bare `version`. Anything
/// else fails fast, before any network call.
pub fn parse_gvk(api_version: &str, kind: &str) -> Result<GroupVersionKind> {
    let mut parts = api_version.split('/');
    let gvk = match (parts.next(), parts.next(), parts.next()) {
        (Some(version), None, None) if !version.is_empty() => {
            GroupVersionKind::gvk("", version, kind)
        }
        (Some(group), Some(version), None) if !group.is_empty() && !version.is_empty() => {
            GroupVersionKind::gvk(group, version, kind)
        }
        _ => return Err(DynamicError::InvalidApiVersion(api_version.to_string())),
    };
    Ok(gvk)
}

/// Build an `Api<DynamicObject>` for a GVK, honouring the resource scope
/// reported by discovery. Namespaced resources with no namespace use the
/// client's default namespace.
pub(crate) async fn dynamic_api(
    client: &Client,
    gvk: &GroupVersionKind,
    namespace: Option<&str>,
) -> Result<Api<DynamicObject>> {
    let (ar, caps) = discovery::pinned_kind(client, gvk).await?;

    let api = match (caps.scope, namespace) {
        (Scope::Namespaced, Some(ns)) if !ns.is_empty() => {
            Api::namespaced_with(client.clone(), ns, &ar)
        }
        (Scope::Namespaced, _) => Api::default_namespaced_with(client.clone(), &ar),
        (Scope::Cluster, _) => Api::all_with(client.clone(), &ar),
    };

    Ok(api)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gvk_core_group() {
        let gvk = parse_gvk("v1", "ConfigMap").unwrap();
        assert_eq!(gvk.group, "");
        assert_eq!(gvk.version, "v1");
        assert_eq!(gvk.kind, "ConfigMap");
    }

    #[test]
    fn test_parse_gvk_named_group() {
        let gvk = parse_gvk("apps/v1", "Deployment").unwrap();
        assert_eq!(gvk.group, "apps");
        assert_eq!(gvk.version, "v1");
        assert_eq!(gvk.kind, "Deployment");
    }

    #[test]
    fn test_parse_gvk_malformed() {
        for bad in ["", "/", "/v1", "apps/", "a/b/c"] {
            assert!(
                matches!(
                    parse_gvk(bad, "Thing"),
                    Err(DynamicError::InvalidApiVersion(_))
                ),
                "expected parse failure for {bad:?}"
            );
        }
    }
}
