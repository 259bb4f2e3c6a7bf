//! Per-run values: explicit invocation inputs and the resolved package.

use std::path::{Path, PathBuf};

/// Explicit stand-in for ambient process state (cwd and argv)
#[derive(Debug, Clone)]
pub struct ScriptContext {
    /// Directory the root search starts from
    pub start_dir: PathBuf,
    /// Arguments after the program name
    pub args: Vec<String>,
}

impl ScriptContext {
    /// Create a context from explicit values
    pub fn new(start_dir: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            start_dir: start_dir.into(),
            args,
        }
    }

    /// Capture the current directory and process arguments
    pub fn from_env() -> std::io::Result<Self> {
        Ok(Self {
            start_dir: std::env::current_dir()?,
            args: std::env::args().skip(1).collect(),
        })
    }

    /// Start from the directory a script lives in, with the process arguments
    pub fn from_script_dir(script_dir: impl Into<PathBuf>) -> Self {
        Self {
            start_dir: script_dir.into(),
            args: std::env::args().skip(1).collect(),
        }
    }
}

/// Quiet mode, decided once per run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuietFlag(bool);

impl QuietFlag {
    /// Quiet when any argument equals one of the aliases
    pub fn from_args<A, S>(args: &[A], aliases: &[S]) -> Self
    where
        A: AsRef<str>,
        S: AsRef<str>,
    {
        let quiet = args
            .iter()
            .any(|arg| aliases.iter().any(|alias| alias.as_ref() == arg.as_ref()));
        Self(quiet)
    }

    pub fn is_quiet(&self) -> bool {
        self.0
    }
}

/// The package a run operates on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// Absolute package root
    pub root: PathBuf,
    /// Final path segment of the root
    pub package_name: String,
}

impl RunContext {
    pub fn new(root: PathBuf) -> Self {
        let package_name = package_name_of(&root);
        Self { root, package_name }
    }
}

fn package_name_of(root: &Path) -> String {
    match root.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => root.display().to_string(),
    }
}
