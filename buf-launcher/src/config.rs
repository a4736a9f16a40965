use crate::error::{LauncherError, Result};
use crate::probe::default_excluded_dirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub default: DefaultConfig,

    #[serde(default)]
    pub release: ReleaseConfig,

    #[serde(default)]
    pub path: PathConfig,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DefaultConfig {
    /// Cache root; `~` is expanded. Falls back to the user cache directory.
    pub cache_dir: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for DefaultConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            timeout: default_timeout(),
        }
    }
}

/// Where releases are discovered and downloaded from
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReleaseConfig {
    #[serde(default = "default_latest_url")]
    pub latest_url: String,

    #[serde(default = "default_download_url")]
    pub download_url: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            latest_url: default_latest_url(),
            download_url: default_download_url(),
        }
    }
}

impl ReleaseConfig {
    /// Artifact URL: `<download_url>/v<version>/<file name>`
    pub fn artifact_url(&self, version: &str, file_name: &str) -> String {
        format!(
            "{}/v{version}/{file_name}",
            self.download_url.trim_end_matches('/')
        )
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PathConfig {
    #[serde(default = "default_excluded_dirs")]
    pub excluded_dirs: Vec<String>,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            excluded_dirs: default_excluded_dirs(),
        }
    }
}

fn default_timeout() -> u64 {
    300
}

fn default_latest_url() -> String {
    "https://github.com/bufbuild/buf/releases/latest".to_string()
}

fn default_download_url() -> String {
    "https://github.com/bufbuild/buf/releases/download".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| LauncherError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("buf-launcher.toml"))
            .unwrap_or_else(|| PathBuf::from("~/.config/buf-launcher.toml"))
    }

    /// Cache root, with `override_dir` taking precedence over the file
    pub fn cache_root(&self, override_dir: Option<&Path>) -> PathBuf {
        if let Some(dir) = override_dir {
            return dir.to_path_buf();
        }

        match &self.default.cache_dir {
            Some(dir) => expand_home(dir),
            None => directories::BaseDirs::new()
                .map(|dirs| dirs.cache_dir().join("buf-launcher"))
                .unwrap_or_else(|| std::env::temp_dir().join("buf-launcher")),
        }
    }

    /// HTTP timeout; zero disables it
    pub fn timeout(&self) -> Option<Duration> {
        match self.default.timeout {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

fn expand_home(path: &str) -> PathBuf {
    if path.starts_with('~') {
        if let Some(home) = directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
        {
            let rest = path.strip_prefix('~').unwrap_or(path);
            let rest = rest.strip_prefix('/').unwrap_or(rest);
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_config() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("test.toml");

        let config_content = r#"
[default]
cache_dir = "/var/cache/buf"
timeout = 60

[release]
latest_url = "https://mirror.example.com/buf/latest"
download_url = "https://mirror.example.com/buf/download/"

[path]
excluded_dirs = ["tools/bin"]
"#;

        fs::write(&config_path, config_content).unwrap();

        let config = Config::load(&config_path).unwrap();

        assert_eq!(config.cache_root(None), PathBuf::from("/var/cache/buf"));
        assert_eq!(config.timeout(), Some(Duration::from_secs(60)));
        assert_eq!(config.release.latest_url, "https://mirror.example.com/buf/latest");
        assert_eq!(
            config.release.artifact_url("1.6.0", "buf-Linux-x86_64"),
            "https://mirror.example.com/buf/download/v1.6.0/buf-Linux-x86_64"
        );
        assert_eq!(config.path.excluded_dirs, vec!["tools/bin".to_string()]);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.default.timeout, 300);
        assert_eq!(
            config.release.artifact_url("1.6.0", "buf-Darwin-arm64"),
            "https://github.com/bufbuild/buf/releases/download/v1.6.0/buf-Darwin-arm64"
        );
        assert_eq!(config.path.excluded_dirs, default_excluded_dirs());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.default.timeout, 300);
        assert!(config.default.cache_dir.is_none());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("partial.toml");
        fs::write(&config_path, "[default]\ntimeout = 0\n").unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.timeout(), None);
        assert_eq!(config.release.latest_url, default_latest_url());
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("broken.toml");
        fs::write(&config_path, "[default\ntimeout = ").unwrap();

        let result = Config::load(&config_path);
        assert!(matches!(result, Err(LauncherError::Config { .. })));
    }

    #[test]
    fn test_cache_root_override_wins() {
        let config = Config::default();
        let root = config.cache_root(Some(Path::new("/tmp/override")));
        assert_eq!(root, PathBuf::from("/tmp/override"));
    }
}
