//! dephash - pinned, hashed production requirements for Python projects
//!
//! dephash turns a loose development requirements file into a production
//! requirements file in which every package is pinned to an exact version
//! and carries the digest of its distribution artifact:
//!
//! ```text
//! # Generated from dephash
//! python-dateutil==2.5.3 --hash=sha512:...
//! six==1.10.0 --hash=sha512:...
//! ```
//!
//! # Architecture Overview
//!
//! A run installs the development requirements into a throwaway environment,
//! records what was actually installed, downloads the matching distribution
//! files, hashes them, and joins the two by filename.
//!
//! - [`pipeline`] - Sequencing of the run and ownership of scratch directories
//! - [`toolchain`] - The external `virtualenv` and `pip` invocations
//! - [`process`] - Running external commands and capturing their output
//! - [`freeze`] - Parsing `pip freeze` and `pip --version` output
//! - [`detect`] - Whether a requirements file pins the installer itself
//! - [`hashes`] - Hash tool output, the built-in hasher and filename matching
//! - [`packages`] - Resolved and pinned package tables
//! - [`render`] - The production file format
//! - [`output`] - Output destinations and default output path derivation
//!
//! ## Supporting Modules
//! - [`cli`] - Command-line interface
//! - [`config`] - Optional TOML configuration
//! - [`core`] - Error types and user-facing error reports
//! - [`constants`] - Defaults
//! - [`utils`] - Filesystem helpers
//!
//! # Configuration
//!
//! ```toml
//! # ~/.config/dephash/config.toml
//! virtualenv = "/usr/local/bin/virtualenv"
//! algorithm = "sha256"
//! hasher = "builtin"
//! scratch_dir = "/var/tmp"
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod detect;
pub mod freeze;
pub mod hashes;
pub mod output;
pub mod packages;
pub mod pipeline;
pub mod process;
pub mod render;
pub mod toolchain;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
