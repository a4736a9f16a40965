use crate::error::{LauncherError, Result};
use crate::release::{ReleaseName, BINARY_NAME};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// A release artifact found in the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledEntry {
    pub name: ReleaseName,
    pub version: String,
    pub path: PathBuf,
}

/// Version-keyed store of downloaded artifacts: `<root>/<version>/<file>`.
///
/// Holds no index. Every query rescans the directory tree.
#[derive(Debug, Clone)]
pub struct InstallCache {
    root: PathBuf,
    prefix: String,
}

impl InstallCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_prefix(root, BINARY_NAME)
    }

    /// Cache whose listing only reports files starting with `prefix`
    pub fn with_prefix(root: impl Into<PathBuf>, prefix: &str) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Enumerate every cached artifact. A missing root yields no entries.
    pub fn list_installed(&self) -> Result<Vec<InstalledEntry>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        let walker = walkdir::WalkDir::new(&self.root)
            .min_depth(2)
            .max_depth(2)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|e| {
                e.into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory walk failed"))
            })?;

            if entry.file_type().is_dir() {
                continue;
            }

            let Some(file_name) = entry.file_name().to_str() else {
                continue;
            };
            if !file_name.starts_with(&self.prefix) {
                continue;
            }

            let Some(version) = entry
                .path()
                .parent()
                .and_then(|dir| dir.file_name())
                .and_then(|name| name.to_str())
            else {
                continue;
            };

            entries.push(InstalledEntry {
                name: ReleaseName::new(version, file_name),
                version: version.to_string(),
                path: absolute(entry.path())?,
            });
        }

        Ok(entries)
    }

    /// Look up the entry whose name equals `name`
    pub fn find(&self, name: &ReleaseName) -> Result<Option<InstalledEntry>> {
        Ok(self
            .list_installed()?
            .into_iter()
            .find(|entry| &entry.name == name))
    }

    /// Write `bytes` to `<root>/<name>`, creating directories as needed and
    /// overwriting any existing file. The write is not atomic.
    ///
    /// The version and file name must each be a single plain path component
    /// so the artifact stays under the root.
    pub fn write_installed(&self, name: &ReleaseName, bytes: &[u8]) -> Result<PathBuf> {
        let version = single_component(name.version(), "version")?;
        let file_name = single_component(name.file_name(), "file name")?;
        let dest = self.root.join(version).join(file_name);

        if let Some(parent) = dest.parent() {
            create_dir_all_checked(parent)?;
        }

        tracing::info!("Writing {} ({} bytes)", dest.display(), bytes.len());
        fs::write(&dest, bytes)?;
        make_executable(&dest)?;

        Ok(dest)
    }
}

/// `fs::create_dir_all` that names the offending path when a non-directory
/// is in the way
fn create_dir_all_checked(dir: &Path) -> Result<()> {
    let mut missing = Vec::new();
    let mut current = Some(dir);

    while let Some(path) = current {
        match fs::metadata(path) {
            Ok(metadata) if metadata.is_dir() => break,
            Ok(_) => {
                return Err(LauncherError::PathCollision {
                    path: path.display().to_string(),
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                missing.push(path);
                current = path.parent();
            }
            Err(e) => return Err(e.into()),
        }
    }

    for path in missing.into_iter().rev() {
        tracing::debug!("Creating directory {}", path.display());
        match fs::create_dir(path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && path.is_dir() => {}
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

fn single_component<'a>(value: &'a str, what: &str) -> Result<&'a str> {
    let mut components = Path::new(value).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if part == value => Ok(value),
        _ => Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("release {what} '{value}' is not a single path component"),
        )
        .into()),
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Set the execute bits for owner, group and other
#[cfg(unix)]
pub fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_mode(permissions.mode() | 0o755);
    fs::set_permissions(path, permissions)?;
    Ok(())
}

#[cfg(windows)]
pub fn make_executable(_path: &Path) -> Result<()> {
    // No-op on Windows
    Ok(())
}
