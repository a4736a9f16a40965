use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::cli::Args;
use crate::config::Config;
use crate::error::Result;
use crate::installer::Installer;
use crate::probe::PathProbe;
use crate::version::find_manifest_version;

/// Executable chosen for this invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBinary {
    pub path: PathBuf,
    /// Resolved release version; `None` for a binary found on `PATH`
    pub version: Option<String>,
}

pub struct Launcher {
    args: Args,
    config: Config,
}

impl Launcher {
    pub fn new(args: Args) -> Result<Self> {
        let config_path = args.config.clone().unwrap_or_else(Config::default_path);
        let config = Config::load(&config_path)?;
        Ok(Self::with_config(args, config))
    }

    pub fn with_config(args: Args, config: Config) -> Self {
        Self { args, config }
    }

    /// Version pinned on the command line, the environment or a manifest
    pub fn pinned_version(&self, cwd: &Path) -> Option<String> {
        self.args
            .version
            .clone()
            .or_else(|| find_manifest_version(cwd).into_option())
    }

    /// Pick the binary for the current directory and `PATH`
    pub async fn resolve_binary(&self) -> Result<ResolvedBinary> {
        let cwd = std::env::current_dir()?;
        let path_env = std::env::var_os("PATH");
        self.resolve_binary_in(&cwd, path_env.as_deref()).await
    }

    /// Use an existing installation on `path_env` unless a version is
    /// pinned; otherwise install into the cache.
    pub async fn resolve_binary_in(
        &self,
        cwd: &Path,
        path_env: Option<&OsStr>,
    ) -> Result<ResolvedBinary> {
        let pinned = self.pinned_version(cwd);

        if pinned.is_none() {
            let probe = PathProbe::new(&self.config.path.excluded_dirs);
            if let Some(path) = probe.find_in_path(path_env) {
                tracing::info!("Using buf from PATH at {}", path.display());
                return Ok(ResolvedBinary {
                    path,
                    version: None,
                });
            }
        }

        let cache_root = self.config.cache_root(self.args.cache_dir.as_deref());
        let installer = Installer::from_config(&self.config, cache_root)?;
        let entry = installer.ensure_installed(pinned.as_deref()).await?;

        Ok(ResolvedBinary {
            path: entry.path,
            version: Some(entry.version),
        })
    }

    /// Run `binary` with the forwarded arguments and return its exit code
    pub fn run(&self, binary: &ResolvedBinary) -> Result<i32> {
        tracing::debug!("Executing {} {:?}", binary.path.display(), self.args.args);
        let status = Command::new(&binary.path).args(&self.args.args).status()?;

        // Terminated by a signal
        Ok(status.code().unwrap_or(1))
    }
}
