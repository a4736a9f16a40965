use anyhow::{Context, Result};
use buf_launcher::cli::Args;
use buf_launcher::launcher::Launcher;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing on stderr; stdout belongs to buf
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let launcher = Launcher::new(args).context("Failed to load configuration")?;
    let binary = launcher
        .resolve_binary()
        .await
        .context("Failed to locate or install buf")?;
    let code = launcher
        .run(&binary)
        .with_context(|| format!("Failed to execute {}", binary.path.display()))?;

    std::process::exit(code);
}
