//! OCI registry chart pull

use super::{ChartArchive, GetOptions};
use crate::error::{ChartError, Result};
use crate::repo::parse_lenient;
use oci_client::client::{Client, ClientConfig};
use oci_client::secrets::RegistryAuth;
use oci_client::Reference;
use semver::VersionReq;
use tracing::debug;

/// Media type helm uses for the chart content layer
const CHART_LAYER_MEDIA_TYPE: &str = "application/vnd.cncf.helm.chart.content.v1.tar+gzip";

pub(crate) async fn fetch(opts: &GetOptions) -> Result<ChartArchive> {
    let repo = opts.uri.trim_start_matches("oci://");
    let client = Client::new(ClientConfig {
        accept_invalid_certificates: opts.insecure_skip_verify_tls,
        ..Default::default()
    });
    let auth = if !opts.username.is_empty() {
        RegistryAuth::Basic(opts.username.clone(), opts.password.clone())
    } else {
        RegistryAuth::Anonymous
    };

    let tag = resolve_tag(&client, &auth, repo, &opts.version).await?;
    let reference: Reference = format!("{repo}:{tag}").parse()?;
    debug!(reference = %reference, "pulling oci chart");

    let image = client
        .pull(&reference, &auth, vec![CHART_LAYER_MEDIA_TYPE])
        .await?;

    let data = image
        .layers
        .into_iter()
        .find(|l| l.media_type == CHART_LAYER_MEDIA_TYPE)
        .map(|l| l.data)
        .ok_or_else(|| ChartError::MissingChartLayer(reference.to_string()))?;

    Ok(ChartArchive {
        data,
        resolved_url: format!("oci://{reference}"),
    })
}

/// Resolve the version request to a concrete tag.
///
/// An exact version skips the tag list round-trip entirely. Otherwise the
/// registry's tags are matched against the constraint, newest first.
async fn resolve_tag(
    client: &Client,
    auth: &RegistryAuth,
    repo: &str,
    version: &str,
) -> Result<String> {
    if !version.is_empty() && parse_lenient(version).is_some() {
        // Registries forbid '+' in tags; helm publishes it as '_'.
        return Ok(version.replace('+', "_"));
    }

    let reference: Reference = repo.parse()?;
    let listed = client.list_tags(&reference, auth, None, None).await?;
    if listed.tags.is_empty() {
        return Err(ChartError::NoTags(repo.to_string()));
    }

    match_version_or_constraint(&listed.tags, version).ok_or_else(|| ChartError::NoVersionMatch {
        name: repo.to_string(),
        constraint: if version.is_empty() { "*" } else { version }.to_string(),
    })
}

/// Pick the best tag for an empty request (highest version) or a semver
/// constraint. Registries forbid `+` in tags, so helm publishes build
/// metadata with `_` instead; both spellings are honored.
fn match_version_or_constraint(tags: &[String], version: &str) -> Option<String> {
    let req = if version.is_empty() {
        VersionReq::STAR
    } else {
        VersionReq::parse(version).ok()?
    };

    let mut best: Option<(semver::Version, String)> = None;
    for tag in tags {
        let candidate = tag.replace('_', "+");
        let Some(parsed) = parse_lenient(&candidate) else {
            continue;
        };
        if !req.matches(&parsed) {
            continue;
        }
        match &best {
            Some((current, _)) if *current >= parsed => {}
            _ => best = Some((parsed, tag.clone())),
        }
    }
    best.map(|(_, tag)| tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_match_empty_picks_highest() {
        let tags = tags(&["1.2.0", "1.10.1", "0.9.0"]);
        assert_eq!(match_version_or_constraint(&tags, "").as_deref(), Some("1.10.1"));
    }

    #[test]
    fn test_match_constraint() {
        let tags = tags(&["1.2.0", "1.10.1", "2.0.0"]);
        assert_eq!(
            match_version_or_constraint(&tags, ">=1.0, <2.0").as_deref(),
            Some("1.10.1")
        );
    }

    #[test]
    fn test_match_underscore_build_metadata() {
        let tags = tags(&["1.0.0_abc123"]);
        assert_eq!(
            match_version_or_constraint(&tags, "").as_deref(),
            Some("1.0.0_abc123")
        );
    }

    #[test]
    fn test_match_skips_unparseable_tags() {
        let tags = tags(&["latest", "1.0.0"]);
        assert_eq!(match_version_or_constraint(&tags, "").as_deref(), Some("1.0.0"));
    }

    #[test]
    fn test_match_none() {
        let tags = tags(&["1.0.0"]);
        assert_eq!(match_version_or_constraint(&tags, ">=2.0"), None);
    }
}
