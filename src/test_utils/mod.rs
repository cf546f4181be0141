//! Test utilities for dephash
//!
//! One-time logging setup, and [`FakeToolchain`]: a scripted stand-in for
//! `virtualenv` and `pip` that lets the pipeline run without a Python
//! installation.
//!
//! # Example
//!
//! ```rust,ignore
//! use dephash::test_utils::{FakeStep, FakeToolchain};
//!
//! let toolchain = FakeToolchain::new()
//!     .with_freeze("six==1.10.0\n")
//!     .with_artifact("six-1.10.0-py2.py3-none-any.whl")
//!     .failing_at(FakeStep::Install);
//! ```

pub mod fake_toolchain;

pub use fake_toolchain::{FakeStep, FakeToolchain};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, tests stay silent.
///
/// ```bash
/// RUST_LOG=pipeline=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true) // "process", "pipeline"
            .with_thread_ids(false)
            .try_init();
    });
}
