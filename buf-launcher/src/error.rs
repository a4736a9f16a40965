use thiserror::Error;

#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("Invalid URL '{url}': expected an absolute http:// or https:// URL")]
    InvalidUrl { url: String },

    #[error("Too many redirects while fetching {url} (followed: {})", .chain.join(" -> "))]
    TooManyRedirects { url: String, chain: Vec<String> },

    #[error("Redirect response from {url} (HTTP {status}) has no Location header")]
    MissingLocation { url: String, status: u16 },

    #[error("Did not get expected redirect from {url}: HTTP {status}")]
    ExpectedRedirect { url: String, status: u16 },

    #[error("Request to {url} failed: HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot create directory {path}: a non-directory file already exists at that path")]
    PathCollision { path: String },

    #[error("Failed to retrieve latest version: {source}")]
    LatestVersion {
        #[source]
        source: Box<LauncherError>,
    },

    #[error("Cannot extract a version from latest release location '{location}'")]
    UnparseableLatestLocation { location: String },

    #[error("Failed to download buf {version}. Is the version spelled correctly? {source}")]
    Download {
        version: String,
        #[source]
        source: Box<LauncherError>,
    },

    #[error("Failed to install {name}: not found under {root} after writing")]
    InstallVerification { name: String, root: String },

    #[error("Configuration error at {path}: {message}")]
    Config { path: String, message: String },
}

impl LauncherError {
    /// Wrap an error raised while resolving the "latest" version
    pub fn latest_version(source: LauncherError) -> Self {
        LauncherError::LatestVersion {
            source: Box::new(source),
        }
    }

    /// Wrap an error raised while downloading a specific version
    pub fn download(version: &str, source: LauncherError) -> Self {
        LauncherError::Download {
            version: version.to_string(),
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, LauncherError>;
