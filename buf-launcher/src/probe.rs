use crate::release::BINARY_NAME;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Directories holding this launcher's own shim rather than a real install
pub fn default_excluded_dirs() -> Vec<String> {
    vec!["node_modules/.bin".to_string(), ".yarn/bin".to_string()]
}

/// Searches `PATH` for an existing installation of the tool
#[derive(Debug, Clone)]
pub struct PathProbe {
    excluded_dirs: Vec<PathBuf>,
    executable: String,
    /// Canonical path of the running launcher, never returned as a match
    self_exe: Option<PathBuf>,
}

impl Default for PathProbe {
    fn default() -> Self {
        Self::new(&default_excluded_dirs())
    }
}

impl PathProbe {
    pub fn new(excluded_dirs: &[String]) -> Self {
        let executable = if cfg!(windows) {
            format!("{BINARY_NAME}.exe")
        } else {
            BINARY_NAME.to_string()
        };

        let self_exe = std::env::current_exe()
            .and_then(|exe| exe.canonicalize())
            .ok();

        Self {
            excluded_dirs: excluded_dirs.iter().map(PathBuf::from).collect(),
            executable,
            self_exe,
        }
    }

    /// Treat `exe` as the running launcher instead of `current_exe()`
    pub fn with_self_exe(mut self, exe: &Path) -> Self {
        self.self_exe = exe.canonicalize().ok();
        self
    }

    /// First existing `<dir>/buf` for the directories of `path_env`, skipping
    /// excluded directories and the launcher itself. Symlinks are followed;
    /// existence is the only check made.
    pub fn find_in_path(&self, path_env: Option<&OsStr>) -> Option<PathBuf> {
        let path_env = path_env?;

        std::env::split_paths(path_env)
            .filter(|dir| !dir.as_os_str().is_empty())
            .filter(|dir| !self.is_excluded(dir))
            .map(|dir| expand_tilde(&dir.join(&self.executable)))
            .filter(|candidate| candidate.try_exists().unwrap_or(false))
            .find(|candidate| !self.is_self(candidate))
    }

    fn is_excluded(&self, dir: &Path) -> bool {
        self.excluded_dirs.iter().any(|suffix| dir.ends_with(suffix))
    }

    fn is_self(&self, candidate: &Path) -> bool {
        match (&self.self_exe, candidate.canonicalize()) {
            (Some(exe), Ok(candidate)) => *exe == candidate,
            _ => false,
        }
    }
}

/// Replace a leading `~` component with the user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match directories::BaseDirs::new() {
            Some(dirs) => dirs.home_dir().join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::fs;
    use tempfile::tempdir;

    fn join_paths(dirs: &[&PathBuf]) -> OsString {
        std::env::join_paths(dirs).unwrap()
    }

    fn executable_name() -> &'static str {
        if cfg!(windows) {
            "buf.exe"
        } else {
            "buf"
        }
    }

    #[test]
    fn test_unset_path_is_not_found() {
        assert_eq!(PathProbe::default().find_in_path(None), None);
    }

    #[test]
    fn test_finds_first_existing_candidate() {
        let dir = tempdir().unwrap();
        let empty = dir.path().join("empty");
        let first = dir.path().join("first");
        let second = dir.path().join("second");
        for d in [&empty, &first, &second] {
            fs::create_dir_all(d).unwrap();
        }
        fs::write(first.join(executable_name()), "").unwrap();
        fs::write(second.join(executable_name()), "").unwrap();

        let path = join_paths(&[&empty, &first, &second]);
        let found = PathProbe::default().find_in_path(Some(&path));
        assert_eq!(found, Some(first.join(executable_name())));
    }

    #[test]
    fn test_project_shim_dir_is_excluded() {
        let dir = tempdir().unwrap();
        let shim_dir = dir.path().join("node_modules").join(".bin");
        fs::create_dir_all(&shim_dir).unwrap();
        fs::write(shim_dir.join(executable_name()), "").unwrap();

        let path = join_paths(&[&shim_dir]);
        assert_eq!(PathProbe::default().find_in_path(Some(&path)), None);
    }

    #[test]
    fn test_global_shim_dir_is_excluded() {
        let dir = tempdir().unwrap();
        let yarn_bin = dir.path().join(".yarn").join("bin");
        let system_bin = dir.path().join("usr").join("bin");
        fs::create_dir_all(&yarn_bin).unwrap();
        fs::create_dir_all(&system_bin).unwrap();
        fs::write(yarn_bin.join(executable_name()), "").unwrap();
        fs::write(system_bin.join(executable_name()), "").unwrap();

        let path = join_paths(&[&yarn_bin, &system_bin]);
        let found = PathProbe::default().find_in_path(Some(&path));
        assert_eq!(found, Some(system_bin.join(executable_name())));
    }

    #[test]
    fn test_custom_exclusions() {
        let dir = tempdir().unwrap();
        let vendored = dir.path().join("tools").join("bin");
        fs::create_dir_all(&vendored).unwrap();
        fs::write(vendored.join(executable_name()), "").unwrap();

        let path = join_paths(&[&vendored]);
        let probe = PathProbe::new(&["tools/bin".to_string()]);
        assert_eq!(probe.find_in_path(Some(&path)), None);
        assert!(PathProbe::new(&[]).find_in_path(Some(&path)).is_some());
    }

    #[test]
    fn test_running_launcher_is_skipped() {
        let dir = tempdir().unwrap();
        let launcher_dir = dir.path().join("cargo").join("bin");
        let system_bin = dir.path().join("usr").join("bin");
        fs::create_dir_all(&launcher_dir).unwrap();
        fs::create_dir_all(&system_bin).unwrap();
        let launcher = launcher_dir.join(executable_name());
        fs::write(&launcher, "").unwrap();

        let probe = PathProbe::default().with_self_exe(&launcher);

        let path = join_paths(&[&launcher_dir]);
        assert_eq!(probe.find_in_path(Some(&path)), None);

        fs::write(system_bin.join(executable_name()), "").unwrap();
        let path = join_paths(&[&launcher_dir, &system_bin]);
        assert_eq!(
            probe.find_in_path(Some(&path)),
            Some(system_bin.join(executable_name()))
        );
    }

    #[test]
    fn test_current_exe_directory_is_skipped() {
        let exe = std::env::current_exe().unwrap();
        let exe_dir = exe.parent().unwrap().to_path_buf();
        let file_name = exe.file_name().unwrap().to_str().unwrap().to_string();

        let mut probe = PathProbe::default();
        probe.executable = file_name;

        let path = join_paths(&[&exe_dir]);
        assert_eq!(probe.find_in_path(Some(&path)), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_to_launcher_is_skipped() {
        let dir = tempdir().unwrap();
        let launcher_dir = dir.path().join("real");
        let link_dir = dir.path().join("linked");
        fs::create_dir_all(&launcher_dir).unwrap();
        fs::create_dir_all(&link_dir).unwrap();
        let launcher = launcher_dir.join(executable_name());
        fs::write(&launcher, "").unwrap();
        std::os::unix::fs::symlink(&launcher, link_dir.join(executable_name())).unwrap();

        let probe = PathProbe::default().with_self_exe(&launcher);
        let path = join_paths(&[&link_dir]);
        assert_eq!(probe.find_in_path(Some(&path)), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_not_an_installation() {
        let dir = tempdir().unwrap();
        let broken_dir = dir.path().join("broken");
        let system_bin = dir.path().join("usr").join("bin");
        fs::create_dir_all(&broken_dir).unwrap();
        fs::create_dir_all(&system_bin).unwrap();
        std::os::unix::fs::symlink(
            dir.path().join("missing-target"),
            broken_dir.join(executable_name()),
        )
        .unwrap();
        fs::write(system_bin.join(executable_name()), "").unwrap();

        let path = join_paths(&[&broken_dir]);
        assert_eq!(PathProbe::default().find_in_path(Some(&path)), None);

        let path = join_paths(&[&broken_dir, &system_bin]);
        assert_eq!(
            PathProbe::default().find_in_path(Some(&path)),
            Some(system_bin.join(executable_name()))
        );
    }

    #[test]
    fn test_expand_tilde() {
        let home = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf());
        if let Some(home) = home {
            assert_eq!(
                expand_tilde(Path::new("~/.local/bin/buf")),
                home.join(".local/bin/buf")
            );
        }
        assert_eq!(
            expand_tilde(Path::new("/usr/bin/buf")),
            PathBuf::from("/usr/bin/buf")
        );
    }
}
