use std::fmt;

/// Name of the launched executable, and the prefix of every release asset
pub const BINARY_NAME: &str = "buf";

/// Platform, architecture and version of one installable release artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseIdentity {
    pub platform: String,
    pub arch: String,
    pub version: String,
}

impl ReleaseIdentity {
    pub fn new(platform: &str, arch: &str, version: &str) -> Self {
        Self {
            platform: platform.to_string(),
            arch: arch.to_string(),
            version: version.to_string(),
        }
    }

    /// Identity for `version` on the given host
    pub fn for_host(host: &HostPlatform, version: &str) -> Self {
        Self::new(&host.platform, &host.arch, version)
    }

    /// Asset file name, e.g. `buf-Darwin-arm64` or `buf-Windows-x86_64.exe`
    pub fn file_name(&self) -> String {
        let (platform, extension) = match self.platform.as_str() {
            "win32" | "windows" => ("Windows".to_string(), ".exe"),
            other => (capitalize(other), ""),
        };
        let arch = match self.arch.as_str() {
            "x64" => "x86_64",
            other => other,
        };

        format!("{BINARY_NAME}-{platform}-{arch}{extension}")
    }

    pub fn release_name(&self) -> ReleaseName {
        make_release_name(self)
    }
}

/// Cache key and relative cache path of one artifact: `<version>/<file name>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReleaseName(String);

impl ReleaseName {
    pub fn new(version: &str, file_name: &str) -> Self {
        Self(format!("{version}/{file_name}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn version(&self) -> &str {
        self.0.rsplit_once('/').map(|(v, _)| v).unwrap_or("")
    }

    pub fn file_name(&self) -> &str {
        self.0.rsplit_once('/').map(|(_, f)| f).unwrap_or(&self.0)
    }
}

impl fmt::Display for ReleaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for ReleaseName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Map a release identity to its canonical [`ReleaseName`]. Pure; the
/// version is passed through without validation.
pub fn make_release_name(identity: &ReleaseIdentity) -> ReleaseName {
    ReleaseName::new(&identity.version, &identity.file_name())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Host platform expressed in release naming vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPlatform {
    pub platform: String,
    pub arch: String,
}

impl HostPlatform {
    pub fn new(platform: &str, arch: &str) -> Self {
        Self {
            platform: platform.to_string(),
            arch: arch.to_string(),
        }
    }

    /// Detect the platform this process runs on
    pub fn current() -> Self {
        Self::from_consts(std::env::consts::OS, std::env::consts::ARCH)
    }

    fn from_consts(os: &str, arch: &str) -> Self {
        let platform = match os {
            "windows" => "win32",
            "macos" => "darwin",
            other => other,
        };
        // Upstream publishes arm64 for Darwin/Windows but aarch64 for Linux
        let arch = match (platform, arch) {
            (_, "x86_64") => "x64",
            ("darwin" | "win32", "aarch64") => "arm64",
            (_, other) => other,
        };

        Self::new(platform, arch)
    }

    pub fn is_windows(&self) -> bool {
        self.platform == "win32"
    }
}
