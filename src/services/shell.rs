//! Subprocess layer used by script bodies.
//!
//! A `Shell` echoes each command to stderr while verbose. Clones share the
//! same verbosity switch, so a runner can silence a shell that a task has
//! already captured.

use crate::error::{ShellError, ShellResult};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::process::Command;

/// Handle to the verbosity of a subprocess layer
pub trait VerbosityControl {
    fn set_verbose(&self, verbose: bool);
    fn is_verbose(&self) -> bool;
}

/// Captured result of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs commands, optionally echoing them first
#[derive(Debug, Clone)]
pub struct Shell {
    verbose: Arc<AtomicBool>,
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}

impl Shell {
    /// Create a verbose shell
    pub fn new() -> Self {
        Self {
            verbose: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Run a command and capture its output
    pub async fn run<S: AsRef<str>>(&self, program: &str, args: &[S]) -> ShellResult<ShellOutput> {
        let command_line = self.prepare(program, args)?;

        let output = Command::new(program)
            .args(args.iter().map(AsRef::as_ref))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ShellError::Spawn {
                command: command_line.clone(),
                message: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(ShellError::NonZeroExit {
                command: command_line,
                code: output.status.code(),
                stderr,
            });
        }

        Ok(ShellOutput { stdout, stderr })
    }

    /// Run a command with the parent's stdio attached
    pub async fn run_inherited<S: AsRef<str>>(&self, program: &str, args: &[S]) -> ShellResult<()> {
        let command_line = self.prepare(program, args)?;

        let status = Command::new(program)
            .args(args.iter().map(AsRef::as_ref))
            .status()
            .await
            .map_err(|e| ShellError::Spawn {
                command: command_line.clone(),
                message: e.to_string(),
            })?;

        if !status.success() {
            return Err(ShellError::NonZeroExit {
                command: command_line,
                code: status.code(),
                stderr: String::new(),
            });
        }

        Ok(())
    }

    fn prepare<S: AsRef<str>>(&self, program: &str, args: &[S]) -> ShellResult<String> {
        if program.is_empty() {
            return Err(ShellError::EmptyCommand);
        }

        let command_line = command_line(program, args);
        if self.is_verbose() {
            eprintln!("$ {}", command_line);
        }
        tracing::debug!("Running {}", command_line);
        Ok(command_line)
    }
}

impl VerbosityControl for Shell {
    fn set_verbose(&self, verbose: bool) {
        self.verbose.store(verbose, Ordering::SeqCst);
    }

    fn is_verbose(&self) -> bool {
        self.verbose.load(Ordering::SeqCst)
    }
}

fn command_line<S: AsRef<str>>(program: &str, args: &[S]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(AsRef::as_ref))
        .collect::<Vec<_>>()
        .join(" ")
}
