//! Helm repository index model
//!
//! A repository index (`index.yaml`) maps chart names to their published
//! versions. Entries are kept sorted newest-first so "no version given"
//! resolves to the latest release.

use crate::error::{ChartError, Result};
use semver::{Version, VersionReq};
use serde::Deserialize;
use std::collections::HashMap;

/// One published chart version inside a repository index
#[derive(Debug, Clone)]
pub struct ChartVersion {
    pub name: String,
    pub version: String,
    pub api_version: String,
    pub urls: Vec<String>,
}

/// Parsed `index.yaml`
#[derive(Debug)]
pub struct IndexFile {
    pub api_version: String,
    pub entries: HashMap<String, Vec<ChartVersion>>,
}

#[derive(Deserialize)]
struct RawIndex {
    #[serde(rename = "apiVersion")]
    api_version: Option<String>,
    #[serde(default)]
    entries: HashMap<String, Vec<RawChartVersion>>,
}

#[derive(Deserialize)]
struct RawChartVersion {
    name: Option<String>,
    version: Option<String>,
    #[serde(rename = "apiVersion")]
    api_version: Option<String>,
    #[serde(default)]
    urls: Vec<String>,
}

impl IndexFile {
    /// Parse and validate raw `index.yaml` bytes.
    ///
    /// An empty body or an index without its top-level apiVersion is
    /// rejected, matching helm's own loader. Entries missing a name or
    /// version are dropped; an absent per-entry apiVersion defaults to `v1`.
    /// Versions are sorted descending per chart.
    pub fn load(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(ChartError::EmptyIndex);
        }

        let raw: RawIndex = serde_yaml::from_slice(data)?;
        let api_version = match raw.api_version {
            Some(v) if !v.is_empty() => v,
            _ => return Err(ChartError::NoApiVersion),
        };

        let mut entries: HashMap<String, Vec<ChartVersion>> = HashMap::new();
        for (chart, versions) in raw.entries {
            let mut kept = Vec::with_capacity(versions.len());
            for v in versions {
                let (Some(name), Some(version)) = (v.name, v.version) else {
                    continue;
                };
                kept.push(ChartVersion {
                    name,
                    version,
                    api_version: v.api_version.unwrap_or_else(|| "v1".to_string()),
                    urls: v.urls,
                });
            }
            sort_versions_desc(&mut kept);
            entries.insert(chart, kept);
        }

        Ok(Self {
            api_version,
            entries,
        })
    }

    /// Look up a chart entry.
    ///
    /// An empty `version` selects the highest published version. Otherwise an
    /// exact version match wins, and failing that the string is treated as a
    /// semver constraint (`>=1.2.0`, `1.x`, ...).
    pub fn get(&self, name: &str, version: &str) -> Result<&ChartVersion> {
        let versions = self
            .entries
            .get(name)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ChartError::ChartNotFound {
                name: name.to_string(),
            })?;

        if version.is_empty() {
            return Ok(&versions[0]);
        }

        if let Some(exact) = versions.iter().find(|v| v.version == version) {
            return Ok(exact);
        }

        let req = VersionReq::parse(version).map_err(|source| ChartError::InvalidConstraint {
            constraint: version.to_string(),
            source,
        })?;
        versions
            .iter()
            .find(|v| parse_lenient(&v.version).is_some_and(|sv| req.matches(&sv)))
            .ok_or_else(|| ChartError::NoVersionMatch {
                name: name.to_string(),
                constraint: version.to_string(),
            })
    }
}

fn sort_versions_desc(versions: &mut [ChartVersion]) {
    versions.sort_by(|a, b| {
        match (parse_lenient(&a.version), parse_lenient(&b.version)) {
            (Some(va), Some(vb)) => vb.cmp(&va),
            // Unparseable versions sink to the bottom.
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => b.version.cmp(&a.version),
        }
    });
}

/// Parse a version, tolerating the common `v` prefix.
pub(crate) fn parse_lenient(version: &str) -> Option<Version> {
    Version::parse(version.trim_start_matches('v')).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = r#"
apiVersion: v1
entries:
  postgres:
    - name: postgres
      version: 1.2.0
      apiVersion: v2
      urls: ["charts/postgres-1.2.0.tgz"]
    - name: postgres
      version: 1.10.1
      apiVersion: v2
      urls: ["charts/postgres-1.10.1.tgz"]
    - name: postgres
      version: 1.9.3
      apiVersion: v2
      urls: ["charts/postgres-1.9.3.tgz"]
  redis:
    - name: redis
      version: 0.4.0
      apiVersion: v2
      urls: ["https://charts.example.com/redis-0.4.0.tgz"]
"#;

    #[test]
    fn test_load_sorts_versions_descending() {
        let index = IndexFile::load(INDEX.as_bytes()).unwrap();
        let versions: Vec<&str> = index.entries["postgres"]
            .iter()
            .map(|v| v.version.as_str())
            .collect();
        assert_eq!(versions, ["1.10.1", "1.9.3", "1.2.0"]);
    }

    #[test]
    fn test_load_empty_index() {
        assert!(matches!(
            IndexFile::load(b"").unwrap_err(),
            ChartError::EmptyIndex
        ));
    }

    #[test]
    fn test_load_rejects_missing_index_api_version() {
        let bad = r#"
entries:
  app:
    - name: app
      version: 1.0.0
"#;
        assert!(matches!(
            IndexFile::load(bad.as_bytes()).unwrap_err(),
            ChartError::NoApiVersion
        ));
    }

    #[test]
    fn test_load_defaults_entry_api_version() {
        let raw = r#"
apiVersion: v1
entries:
  app:
    - name: app
      version: 1.0.0
"#;
        let index = IndexFile::load(raw.as_bytes()).unwrap();
        assert_eq!(index.entries["app"][0].api_version, "v1");
    }

    #[test]
    fn test_get_empty_version_picks_highest() {
        let index = IndexFile::load(INDEX.as_bytes()).unwrap();
        assert_eq!(index.get("postgres", "").unwrap().version, "1.10.1");
    }

    #[test]
    fn test_get_exact_version() {
        let index = IndexFile::load(INDEX.as_bytes()).unwrap();
        assert_eq!(index.get("postgres", "1.2.0").unwrap().version, "1.2.0");
    }

    #[test]
    fn test_get_constraint() {
        let index = IndexFile::load(INDEX.as_bytes()).unwrap();
        assert_eq!(index.get("postgres", ">=1.3, <1.10").unwrap().version, "1.9.3");
    }

    #[test]
    fn test_get_unknown_chart() {
        let index = IndexFile::load(INDEX.as_bytes()).unwrap();
        assert!(matches!(
            index.get("mysql", "").unwrap_err(),
            ChartError::ChartNotFound { name } if name == "mysql"
        ));
    }

    #[test]
    fn test_get_no_match() {
        let index = IndexFile::load(INDEX.as_bytes()).unwrap();
        assert!(matches!(
            index.get("redis", ">=2.0").unwrap_err(),
            ChartError::NoVersionMatch { .. }
        ));
    }
}
