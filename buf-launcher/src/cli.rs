use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Launcher arguments. Everything not recognized here is forwarded to buf,
/// including `--help` and `--version`.
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "buf",
    about = "Download, cache and run the buf CLI",
    long_about = None,
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Args {
    /// Version of buf to run ("latest" resolves the newest release)
    #[clap(long = "launcher-version", env = "BUF_VERSION", value_name = "VERSION")]
    pub version: Option<String>,

    /// Directory where downloaded releases are cached
    #[clap(long = "launcher-cache-dir", env = "BUF_LAUNCHER_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Configuration file path
    #[clap(long = "launcher-config", env = "BUF_LAUNCHER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Arguments passed through to buf
    #[clap(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<OsString>,
}
