//! Error handling for dephash
//!
//! Two layers, the same split the rest of the crate relies on:
//! 1. [`DephashError`] - strongly-typed failure cases raised by the library
//! 2. [`ErrorContext`] - a user-facing wrapper adding details and a suggestion
//!
//! Library functions return [`DephashError`] (or `anyhow::Error` wrapping one);
//! the binary funnels everything through [`user_friendly_error`] and prints the
//! result with [`ErrorContext::display`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use dephash::core::{DephashError, user_friendly_error};
//!
//! let error = DephashError::MissingHashes {
//!     names: vec!["six".to_string()],
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // coloured report on stderr
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for dephash operations.
///
/// Every variant maps to one failure mode of the pinning pipeline. None of
/// them is retried: an external command runs at most once, and a malformed
/// tool output means the installer speaks a format we do not understand.
#[derive(Error, Debug)]
pub enum DephashError {
    /// An external program could not be located on `PATH`.
    #[error("Command not found: {program}")]
    CommandNotFound {
        /// Program name as it was requested
        program: String,
    },

    /// An external command exited with a non-zero status.
    ///
    /// `output` carries whatever was captured before the failure; it is empty
    /// for commands run in checked mode, which only log their output.
    #[error("Command `{command}` failed with {}", exit_status_label(.exit_code))]
    CommandFailed {
        /// The full command line, space separated
        command: String,
        /// Exit code, `None` when the process was killed by a signal
        exit_code: Option<i32>,
        /// Captured output, if the command was run in capture mode
        output: String,
    },

    /// A line of frozen output did not have the `name==version` shape.
    #[error("Malformed freeze output on line {line_number}: '{line}'")]
    MalformedFreezeLine {
        /// 1-based line number within the freeze output
        line_number: usize,
        /// The offending line, verbatim
        line: String,
    },

    /// The hash tool output did not alternate filename and digest lines.
    #[error("Malformed hash output: {reason}")]
    MalformedHashOutput {
        /// What exactly was wrong
        reason: String,
    },

    /// The installer's `--version` output had no version token.
    #[error("Cannot determine installer version from output: '{output}'")]
    MalformedVersionOutput {
        /// The raw output
        output: String,
    },

    /// One or more resolved packages had no matching downloaded artifact.
    ///
    /// Raised once, after every package has been checked.
    #[error("Missing hashes for {}", .names.join(", "))]
    MissingHashes {
        /// Every package name without a hash, sorted
        names: Vec<String>,
    },

    /// The artifact naming pattern did not compile.
    #[error("Invalid artifact pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern after substitution
        pattern: String,
        /// Regex compiler message
        reason: String,
    },

    /// Configuration file problems.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// `dephash outdated` found packages with newer releases.
    #[error("Found outdated packages")]
    OutdatedPackages {
        /// The installer's listing, as printed
        listing: String,
    },

    /// A filesystem operation on a specific path failed.
    #[error("File system error: cannot {operation} {path}")]
    FileSystemError {
        /// What was attempted
        operation: String,
        /// Where
        path: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("{message}")]
    Other {
        message: String,
    },
}

fn exit_status_label(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Error wrapper with user-facing details and a suggested fix.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: DephashError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: DephashError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion, displayed in green.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details, displayed in yellow.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, details and suggestion to stderr with terminal colors.
    ///
    /// - Error message: red and bold
    /// - Details: yellow
    /// - Suggestion: green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// Recognises [`DephashError`] (also when wrapped in `anyhow` context) and
/// common [`std::io::Error`] kinds. Anything else is reported with its full
/// cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let error = match error.downcast::<DephashError>() {
        Ok(dephash_error) => return create_error_context(dephash_error),
        Err(error) => error,
    };

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        let suggestion = match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => Some("Check file ownership and permissions"),
            std::io::ErrorKind::NotFound => {
                Some("Check that the file or directory exists and the path is correct")
            }
            _ => None,
        };
        if let Some(suggestion) = suggestion {
            let details = io_error.to_string();
            return ErrorContext::new(DephashError::Other {
                message: error.to_string(),
            })
            .with_details(details)
            .with_suggestion(suggestion);
        }
    }

    // Generic error - include the full error chain
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(DephashError::Other {
        message,
    })
}

fn create_error_context(error: DephashError) -> ErrorContext {
    match &error {
        DephashError::CommandNotFound {
            program,
        } => {
            let suggestion = format!(
                "Install '{program}' or point dephash at it explicitly (e.g. --virtualenv /path/to/{program})"
            );
            ErrorContext::new(error).with_suggestion(suggestion)
        }
        DephashError::CommandFailed {
            output,
            ..
        } => {
            let details = if output.trim().is_empty() {
                "Re-run with --verbose to see the command's output".to_string()
            } else {
                output.trim().to_string()
            };
            ErrorContext::new(error)
                .with_details(details)
                .with_suggestion("Check network access and that the requirements file installs cleanly")
        }
        DephashError::MalformedFreezeLine {
            ..
        }
        | DephashError::MalformedHashOutput {
            ..
        }
        | DephashError::MalformedVersionOutput {
            ..
        } => ErrorContext::new(error)
            .with_details("The installer produced output in a format dephash does not understand")
            .with_suggestion("Upgrade pip inside the environment or pin a known-good pip version"),
        DephashError::MissingHashes {
            names,
        } => {
            let details = format!(
                "No downloaded artifact matched {} package(s): {}",
                names.len(),
                names.join(", ")
            );
            ErrorContext::new(error).with_details(details).with_suggestion(
                "Check that the artifact pattern accepts the distribution filenames (see `artifact_pattern`)",
            )
        }
        DephashError::InvalidPattern {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("The pattern must be a valid regex using {name} and {version} placeholders"),
        DephashError::ConfigError {
            ..
        }
        | DephashError::TomlError(_) => ErrorContext::new(error)
            .with_suggestion("Check the dephash configuration file (--config or DEPHASH_CONFIG)"),
        DephashError::OutdatedPackages {
            listing,
        } => {
            let details = listing.clone();
            ErrorContext::new(error).with_details(details)
        }
        _ => ErrorContext::new(error),
    }
}
