//! Core types shared across dephash: the error enum and its user-facing
//! rendering.

pub mod error;

pub use error::{DephashError, ErrorContext, user_friendly_error};
