use std::path::PathBuf;

use crate::cache::{InstallCache, InstalledEntry};
use crate::config::{Config, ReleaseConfig};
use crate::error::{LauncherError, Result};
use crate::fetch::HttpFetcher;
use crate::release::{make_release_name, HostPlatform, ReleaseIdentity};
use crate::version::resolve_version;

/// Resolves a version, then serves it from the cache or downloads it there
pub struct Installer {
    cache: InstallCache,
    fetcher: HttpFetcher,
    release: ReleaseConfig,
    host: HostPlatform,
}

impl Installer {
    pub fn new(cache: InstallCache, fetcher: HttpFetcher, release: ReleaseConfig) -> Self {
        Self {
            cache,
            fetcher,
            release,
            host: HostPlatform::current(),
        }
    }

    pub fn from_config(config: &Config, cache_root: PathBuf) -> Result<Self> {
        let fetcher = HttpFetcher::new(config.timeout())?;
        Ok(Self::new(
            InstallCache::new(cache_root),
            fetcher,
            config.release.clone(),
        ))
    }

    /// Install for `host` instead of the running platform
    pub fn with_host(mut self, host: HostPlatform) -> Self {
        self.host = host;
        self
    }

    pub fn cache(&self) -> &InstallCache {
        &self.cache
    }

    /// Return the cached artifact for `version`, downloading it first if
    /// needed. `None` or `"latest"` resolves the newest release.
    ///
    /// A cache hit makes no network request beyond version resolution.
    /// After a download the cache is listed again and the entry must be
    /// present.
    pub async fn ensure_installed(&self, version: Option<&str>) -> Result<InstalledEntry> {
        let version = resolve_version(&self.fetcher, &self.release.latest_url, version).await?;
        let identity = ReleaseIdentity::for_host(&self.host, &version);
        let name = make_release_name(&identity);

        if let Some(entry) = self.cache.find(&name)? {
            tracing::info!("Using cached {} at {}", name, entry.path.display());
            return Ok(entry);
        }

        let url = self.release.artifact_url(&version, name.file_name());
        tracing::info!("Downloading buf {} from {}", version, url);

        let bytes = self
            .fetcher
            .download(&url)
            .await
            .map_err(|e| LauncherError::download(&version, e))?;

        self.cache.write_installed(&name, &bytes)?;

        let entry = self
            .cache
            .find(&name)?
            .ok_or_else(|| LauncherError::InstallVerification {
                name: name.to_string(),
                root: self.cache.root().display().to_string(),
            })?;

        tracing::info!("Installed {} at {}", name, entry.path.display());
        Ok(entry)
    }
}
