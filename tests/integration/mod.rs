//! Integration test suite for dephash
//!
//! End-to-end tests of the `dephash` binary. `virtualenv` and `pip` are
//! shell-script stand-ins (see `common`), so no network access or Python
//! installation is needed.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! - **cli**: Argument handling and exit codes
//! - **generate**: The `gen` command, output destinations and cleanup
//! - **outdated**: The `outdated` command

#![cfg(unix)]

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod cli;
mod generate;
