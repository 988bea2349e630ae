//! Helm repository (`index.yaml`) chart resolution

use super::{fetch_url, ChartArchive, GetOptions};
use crate::error::{ChartError, Result};
use crate::repo::IndexFile;
use tracing::debug;
use url::Url;

pub(crate) async fn fetch(opts: &GetOptions) -> Result<ChartArchive> {
    let repo_url = Url::parse(&opts.uri).map_err(|source| ChartError::InvalidUrl {
        url: opts.uri.clone(),
        source,
    })?;

    let index_url = join(&repo_url, "index.yaml")?;
    let raw = fetch_url(index_url.as_str(), opts, true).await?;
    let index = IndexFile::load(&raw)?;

    let entry = index.get(&opts.repo, &opts.version)?;
    let package = entry
        .urls
        .first()
        .ok_or_else(|| ChartError::NoPackageUrl {
            name: entry.name.clone(),
            version: entry.version.clone(),
        })?;

    // Package urls may be absolute or relative to the repository root.
    let package_url = match Url::parse(package) {
        Ok(absolute) => absolute,
        Err(url::ParseError::RelativeUrlWithoutBase) => join(&repo_url, package)?,
        Err(source) => {
            return Err(ChartError::InvalidUrl {
                url: package.clone(),
                source,
            })
        }
    };

    debug!(chart = %entry.name, version = %entry.version, url = %package_url, "resolved chart package");

    let same_host = package_url.host_str() == repo_url.host_str();
    let data = fetch_url(package_url.as_str(), opts, same_host || opts.pass_credentials).await?;
    Ok(ChartArchive {
        data,
        resolved_url: package_url.into(),
    })
}

fn join(base: &Url, path: &str) -> Result<Url> {
    // Url::join treats the last path segment as a file unless the base ends
    // with '/', which would drop it from the result.
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        base.set_path(&format!("{}/", base.path()));
    }
    base.join(path).map_err(|source| ChartError::InvalidUrl {
        url: path.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_preserves_repo_path() {
        let base = Url::parse("https://example.com/charts/stable").unwrap();
        assert_eq!(
            join(&base, "index.yaml").unwrap().as_str(),
            "https://example.com/charts/stable/index.yaml"
        );
        assert_eq!(
            join(&base, "packages/app-1.0.0.tgz").unwrap().as_str(),
            "https://example.com/charts/stable/packages/app-1.0.0.tgz"
        );
    }

    #[test]
    fn test_join_with_trailing_slash() {
        let base = Url::parse("https://example.com/charts/").unwrap();
        assert_eq!(
            join(&base, "index.yaml").unwrap().as_str(),
            "https://example.com/charts/index.yaml"
        );
    }
}
