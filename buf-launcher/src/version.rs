use crate::error::{LauncherError, Result};
use crate::fetch::HttpFetcher;
use std::path::Path;

/// Version request that triggers a lookup of the newest release
pub const LATEST: &str = "latest";

/// Manifest searched for a pinned version
pub const MANIFEST_FILE: &str = "package.json";

/// Key path of the pinned version inside [`MANIFEST_FILE`]
pub const MANIFEST_VERSION_KEY: &[&str] = &["config", "bufVersion"];

/// Outcome of searching ancestor manifests for a pinned version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestVersion {
    Found(String),
    NotFound,
}

impl ManifestVersion {
    pub fn into_option(self) -> Option<String> {
        match self {
            ManifestVersion::Found(version) => Some(version),
            ManifestVersion::NotFound => None,
        }
    }
}

/// Turn a requested version into a concrete one.
///
/// `None` and `"latest"` query `latest_url`, which must redirect to a
/// location ending in `/v<version>`. Anything else is returned unchanged.
pub async fn resolve_version(
    fetcher: &HttpFetcher,
    latest_url: &str,
    requested: Option<&str>,
) -> Result<String> {
    match requested {
        Some(version) if version != LATEST => Ok(version.to_string()),
        _ => {
            tracing::info!("Resolving latest buf version from {}", latest_url);
            let location = fetcher
                .resolve_redirect_target(latest_url)
                .await
                .map_err(LauncherError::latest_version)?;
            let version = version_from_location(&location)?;
            tracing::info!("Latest buf version is {}", version);
            Ok(version)
        }
    }
}

/// Everything after the last `/v` of a release location
fn version_from_location(location: &str) -> Result<String> {
    location
        .rfind("/v")
        .map(|idx| location[idx + 2..].to_string())
        .filter(|version| !version.is_empty())
        .ok_or_else(|| {
            LauncherError::latest_version(LauncherError::UnparseableLatestLocation {
                location: location.to_string(),
            })
        })
}

/// Walk from `start` through its ancestors looking for a manifest that pins
/// a version.
///
/// Manifests without the key are skipped. The search stops at the first
/// manifest that cannot be read or parsed.
pub fn find_manifest_version(start: &Path) -> ManifestVersion {
    for dir in start.ancestors() {
        let manifest = dir.join(MANIFEST_FILE);
        if !manifest.is_file() {
            continue;
        }

        let parsed = std::fs::read_to_string(&manifest)
            .ok()
            .and_then(|content| serde_json::from_str::<serde_json::Value>(&content).ok());

        let Some(value) = parsed else {
            tracing::debug!("Ignoring unparseable manifest {}", manifest.display());
            return ManifestVersion::NotFound;
        };

        let pinned = MANIFEST_VERSION_KEY
            .iter()
            .try_fold(&value, |node, key| node.get(key))
            .and_then(|node| node.as_str());

        if let Some(version) = pinned {
            tracing::debug!("Found buf version {} in {}", version, manifest.display());
            return ManifestVersion::Found(version.to_string());
        }
    }

    ManifestVersion::NotFound
}
