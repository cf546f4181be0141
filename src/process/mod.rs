//! Builder for running external tools with consistent logging and errors.
//!
//! Every collaborator dephash talks to (`virtualenv`, `pip`) is a separate
//! program. [`ToolCommand`] wraps one invocation of such a program:
//!
//! - [`ToolCommand::execute`] runs it and hands back the exit code and both
//!   output streams, decoded as UTF-8.
//! - [`ToolCommand::execute_checked`] is "run and check": output is logged at
//!   debug level, a non-zero exit fails with
//!   [`DephashError::CommandFailed`] carrying no output.
//! - [`ToolCommand::execute_stdout`] is "capture output": stdout is returned,
//!   and a non-zero exit fails with the same error with stdout attached.
//!
//! Nothing is retried and nothing times out; a caller that wants a deadline
//! wraps the whole run.
//!
//! # Examples
//!
//! ```rust,no_run
//! use dephash::process::ToolCommand;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let frozen = ToolCommand::new("/tmp/venv/bin/pip")
//!     .args(["--isolated", "freeze"])
//!     .execute_stdout()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::core::DephashError;

/// One invocation of an external program.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    /// Program name or path
    program: String,

    /// Arguments passed to the program
    args: Vec<String>,

    /// Working directory (defaults to the current directory)
    current_dir: Option<PathBuf>,

    /// Extra environment variables
    env_vars: Vec<(String, String)>,

    /// Optional label prefixed to log lines
    context: Option<String>,
}

/// Exit status and decoded output of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, `None` if the process was terminated by a signal
    pub exit_code: Option<i32>,
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

impl ToolOutput {
    /// Whether the command exited with status zero.
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Stdout followed by stderr, the way a terminal would have shown them.
    #[must_use]
    pub fn combined(&self) -> String {
        let mut combined = self.stdout.clone();
        combined.push_str(&self.stderr);
        combined
    }
}

impl ToolCommand {
    /// Start building an invocation of `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            env_vars: Vec::new(),
            context: None,
        }
    }

    /// Run the program from `dir`.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Append a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the child process.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.push((key.into(), value.into()));
        self
    }

    /// Label log lines for this command, e.g. with the pipeline step.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// The command line as it would be typed into a shell (unquoted).
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn log_prefix(&self) -> String {
        self.context.as_ref().map(|ctx| format!("({ctx}) ")).unwrap_or_default()
    }

    /// Run the command to completion and return its exit code and output.
    ///
    /// A non-zero exit is not an error here; only failing to start is.
    pub async fn execute(&self) -> Result<ToolOutput> {
        let start = std::time::Instant::now();
        let program = resolve_program(&self.program)?;
        let prefix = self.log_prefix();

        tracing::debug!(target: "process", "{}Running {}", prefix, self.command_line());

        let mut cmd = Command::new(&program);
        cmd.args(&self.args);
        if let Some(ref dir) = self.current_dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.env_vars {
            tracing::trace!(target: "process", "Setting env var: {}={}", key, value);
            cmd.env(key, value);
        }
        cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());

        let output = cmd
            .output()
            .await
            .with_context(|| format!("Failed to execute {}", self.command_line()))?;

        let result = ToolOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        tracing::debug!(
            target: "process",
            "{}{} exited with {:?} after {}ms",
            prefix,
            self.program,
            result.exit_code,
            start.elapsed().as_millis()
        );

        Ok(result)
    }

    /// Run and check: log the combined output, fail on non-zero exit.
    ///
    /// The error does not carry the output; it has already been logged.
    pub async fn execute_checked(self) -> Result<()> {
        let output = self.execute().await?;
        let combined = output.combined();
        if !combined.trim().is_empty() {
            tracing::debug!(target: "process", "{}{}", self.log_prefix(), combined.trim_end());
        }

        if !output.success() {
            return Err(DephashError::CommandFailed {
                command: self.command_line(),
                exit_code: output.exit_code,
                output: String::new(),
            }
            .into());
        }
        Ok(())
    }

    /// Capture output: return stdout, or fail with stdout attached.
    ///
    /// Stderr is not part of the returned text; it is logged.
    pub async fn execute_stdout(self) -> Result<String> {
        let output = self.execute().await?;
        if !output.stderr.trim().is_empty() {
            tracing::debug!(target: "process", "{}{}", self.log_prefix(), output.stderr.trim_end());
        }

        if !output.success() {
            return Err(DephashError::CommandFailed {
                command: self.command_line(),
                exit_code: output.exit_code,
                output: output.stdout,
            }
            .into());
        }
        Ok(output.stdout)
    }
}

/// Locate `program`: explicit paths are used as given, bare names are looked
/// up on `PATH`.
fn resolve_program(program: &str) -> Result<PathBuf, DephashError> {
    let path = Path::new(program);
    if path.components().count() > 1 {
        if path.exists() {
            // the command may run with a different working directory
            return Ok(std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()));
        }
    } else if let Ok(found) = which::which(program) {
        return Ok(found);
    }

    Err(DephashError::CommandNotFound {
        program: program.to_string(),
    })
}
