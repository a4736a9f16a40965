//! # buf-launcher
//!
//! Runs the `buf` CLI without requiring it to be installed beforehand.
//!
//! ## Overview
//!
//! The launcher picks a version (command line, `BUF_VERSION`, the
//! `config.bufVersion` key of the nearest `package.json`, or the latest
//! release), downloads the matching platform binary from the upstream
//! release page and keeps it in a version-keyed cache:
//!
//! ```text
//! <cache root>/<version>/buf-<Platform>-<arch>[.exe]
//! ```
//!
//! When no version is pinned and `buf` is already on `PATH`, that
//! installation is used instead. Directories that normally hold this
//! launcher's own shim (`node_modules/.bin`, `.yarn/bin`) are skipped.
//!
//! ## Usage
//!
//! ```bash
//! # Run the latest release (or the one on PATH)
//! buf lint
//!
//! # Run a specific version
//! BUF_VERSION=1.6.0 buf generate
//! ```
//!
//! ## Configuration
//!
//! Optional settings live in `buf-launcher.toml` in the user configuration
//! directory; see [`config::Config`].

/// Filesystem cache of downloaded releases
pub mod cache;

/// Launcher command-line arguments
pub mod cli;

/// Configuration file handling
pub mod config;

/// Error types and error handling utilities
pub mod error;

/// HTTP client with bounded redirect following
pub mod fetch;

/// Install orchestration: resolve, check cache, download, verify
pub mod installer;

/// PATH-or-install decision and process execution
pub mod launcher;

/// Search of `PATH` for an existing installation
pub mod probe;

/// Release naming and host platform detection
pub mod release;

/// Version resolution and manifest discovery
pub mod version;
