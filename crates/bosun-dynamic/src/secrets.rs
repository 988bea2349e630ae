//! Secret key resolution through the dynamic getter

use crate::error::{DynamicError, Result};
use crate::getter::{GetOptions, ResourceGetter};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use kube::core::{DynamicObject, GroupVersionKind};

/// Fetch a `v1/Secret` and return the decoded value of one key.
///
/// Secret data arrives base64-encoded from the API server; the decoded
/// bytes must be UTF-8.
pub async fn get_secret(
    getter: &dyn ResourceGetter,
    namespace: &str,
    name: &str,
    key: &str,
) -> Result<String> {
    let obj = getter
        .get(GetOptions {
            gvk: GroupVersionKind::gvk("", "v1", "Secret"),
            namespace: Some(namespace.to_string()),
            name: name.to_string(),
        })
        .await?;

    decode_secret_key(&obj, namespace, name, key)
}

fn decode_secret_key(
    obj: &DynamicObject,
    namespace: &str,
    name: &str,
    key: &str,
) -> Result<String> {
    let encoded = obj
        .data
        .get("data")
        .and_then(|d| d.get(key))
        .and_then(|v| v.as_str())
        .ok_or_else(|| DynamicError::MissingSecretKey {
            namespace: namespace.to_string(),
            name: name.to_string(),
            key: key.to_string(),
        })?;

    let raw = STANDARD.decode(encoded)?;
    Ok(String::from_utf8(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn secret_fixture() -> DynamicObject {
        serde_json::from_value(json!({
            "apiVersion": "v1",
            "kind": "Secret",
            "metadata": {"name": "repo-creds", "namespace": "infra"},
            "data": {
                // base64("s3cr3t")
                "password": "czNjcjN0"
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_decode_secret_key() {
        let obj = secret_fixture();
        let got = decode_secret_key(&obj, "infra", "repo-creds", "password").unwrap();
        assert_eq!(got, "s3cr3t");
    }

    #[test]
    fn test_decode_secret_key_missing() {
        let obj = secret_fixture();
        let err = decode_secret_key(&obj, "infra", "repo-creds", "token").unwrap_err();
        assert!(matches!(
            err,
            DynamicError::MissingSecretKey { key, .. } if key == "token"
        ));
    }

    #[test]
    fn test_decode_secret_key_bad_base64() {
        let obj: DynamicObject = serde_json::from_value(json!({
            "apiVersion": "v1",
            "kind": "Secret",
            "metadata": {"name": "broken"},
            "data": {"password": "%%%"}
        }))
        .unwrap();

        let err = decode_secret_key(&obj, "infra", "broken", "password").unwrap_err();
        assert!(matches!(err, DynamicError::Base64(_)));
    }
}
