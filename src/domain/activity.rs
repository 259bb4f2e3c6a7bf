//! Activity kinds and the status lines they produce.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of script being run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Build,
    Lint,
    Test,
}

impl ActivityKind {
    /// All known kinds
    pub const ALL: [ActivityKind; 3] = [Self::Build, Self::Lint, Self::Test];

    /// Present participle used in the start line
    pub fn start_verb(&self) -> &'static str {
        match self {
            Self::Build => "building",
            Self::Lint => "linting",
            Self::Test => "testing",
        }
    }

    /// Past tense used in the completion line
    pub fn completion_verb(&self) -> &'static str {
        match self {
            Self::Build => "built",
            Self::Lint => "linted",
            Self::Test => "tested",
        }
    }

    /// Lowercase name, as accepted on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Lint => "lint",
            Self::Test => "test",
        }
    }

    /// `Building: foo`
    pub fn start_message(&self, package_name: &str) -> String {
        format!("{}: {}", capitalize_first_letter(self.start_verb()), package_name)
    }

    /// `Successfully built foo in 3 seconds.`
    pub fn completion_message(&self, package_name: &str, elapsed_seconds: u64) -> String {
        format!(
            "Successfully {} {} in {} seconds.",
            self.completion_verb(),
            package_name,
            elapsed_seconds
        )
    }
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("unknown activity: {}", s))
    }
}

/// Whether a run prints status lines, and with which verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reporting {
    /// No start or completion line
    #[default]
    Silent,
    /// Start and completion lines for the given kind
    Announce(ActivityKind),
}

impl Reporting {
    /// The kind to announce, unless silent
    pub fn activity(&self) -> Option<ActivityKind> {
        match self {
            Self::Silent => None,
            Self::Announce(kind) => Some(*kind),
        }
    }
}

impl From<ActivityKind> for Reporting {
    fn from(kind: ActivityKind) -> Self {
        Self::Announce(kind)
    }
}

impl From<Option<ActivityKind>> for Reporting {
    fn from(kind: Option<ActivityKind>) -> Self {
        kind.map_or(Self::Silent, Self::Announce)
    }
}

/// Uppercase the first character, leave the rest alone
pub fn capitalize_first_letter(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
