//! Naming helpers for chart sources

/// Derive a helm release name from a chart source URI.
///
/// For archive urls the basename is used with its extension and trailing
/// `-<version>` stripped: `.../postgres-1.2.0.tgz` yields `postgres`. For
/// oci references the last path segment is used as-is.
pub fn derive_release_name(uri: &str) -> String {
    let base = uri
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(uri);

    let stem = base
        .strip_suffix(".tar.gz")
        .or_else(|| base.strip_suffix(".tgz"))
        .unwrap_or(base);

    // Only cut at '-' when what follows looks like a version, so names
    // like "cert-manager" survive intact.
    if let Some(idx) = stem.rfind('-') {
        let tail = &stem[idx + 1..];
        let tail = tail.strip_prefix('v').unwrap_or(tail);
        if tail.starts_with(|c: char| c.is_ascii_digit()) {
            return stem[..idx].to_string();
        }
    }
    stem.to_string()
}

/// Derive a repository entry name from a chart source when none is given.
pub fn derive_repo_name(uri: &str) -> String {
    derive_release_name(uri)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_from_tgz_url() {
        assert_eq!(
            derive_release_name("https://charts.example.com/postgres-1.2.0.tgz"),
            "postgres"
        );
        assert_eq!(
            derive_release_name("https://charts.example.com/app-v2.0.0.tar.gz"),
            "app"
        );
    }

    #[test]
    fn test_derive_keeps_hyphenated_names() {
        assert_eq!(
            derive_release_name("https://charts.example.com/cert-manager-1.14.0.tgz"),
            "cert-manager"
        );
        assert_eq!(derive_release_name("oci://ghcr.io/org/cert-manager"), "cert-manager");
    }

    #[test]
    fn test_derive_from_oci_reference() {
        assert_eq!(derive_release_name("oci://ghcr.io/org/postgres"), "postgres");
    }

    #[test]
    fn test_derive_plain_name() {
        assert_eq!(derive_release_name("redis"), "redis");
    }
}
