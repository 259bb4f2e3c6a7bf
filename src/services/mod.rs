//! Infrastructure services for pkg-script.
//!
//! This module contains:
//! - RootResolver: Package root discovery
//! - ScriptRunner: Script lifecycle wrapper
//! - Shell: Subprocess execution with a verbosity switch
//! - PackageManifest: `package.json` loading

pub mod fs;
mod manifest;
mod resolver;
pub mod runner;
mod shell;

pub use manifest::PackageManifest;
pub use resolver::{RootResolver, DEFAULT_MARKER};
pub use runner::{build_script, lint_script, script, test_script, ScriptRunner};
pub use shell::{Shell, ShellOutput, VerbosityControl};
