//! pkg-script: uniform build/lint/test script wrapper
//!
//! This crate finds the package a script belongs to, runs the script body
//! from that package's root, and prints consistent start/finish lines.

/// Directory of the crate invoking the macro, for use as a script's starting
/// location.
#[macro_export]
macro_rules! script_dir {
    () => {
        ::std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
    };
}

pub mod config;
pub mod domain;
pub mod error;
pub mod services;

pub use config::ScriptConfig;
pub use domain::{ActivityKind, Reporting, RunContext, ScriptContext};
pub use error::{Result, ScriptError};
pub use services::{RootResolver, ScriptRunner, Shell};
