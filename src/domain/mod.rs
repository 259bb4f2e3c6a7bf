//! Domain types for pkg-script.
//!
//! This module contains:
//! - ActivityKind / Reporting: which status lines a run prints
//! - ScriptContext: explicit invocation inputs
//! - RunContext: the resolved package

mod activity;
mod context;

pub use activity::{capitalize_first_letter, ActivityKind, Reporting};
pub use context::{QuietFlag, RunContext, ScriptContext};
