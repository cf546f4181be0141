//! Filesystem utilities.

pub mod fs;

pub use fs::{atomic_write, ensure_dir};
