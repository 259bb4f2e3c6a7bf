//! Package root discovery.
//!
//! Walks up from a starting directory to the nearest directory holding the
//! manifest marker. The walk ends when a directory's parent is the directory
//! itself, which only happens at a filesystem root.

use super::fs::{FileProbe, StdFs};
use std::path::{Component, Path, PathBuf};

/// Default manifest marker
pub const DEFAULT_MARKER: &str = "package.json";

/// Finds the nearest ancestor containing a manifest marker
#[derive(Debug, Clone)]
pub struct RootResolver<P = StdFs> {
    marker: String,
    probe: P,
}

impl Default for RootResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER)
    }
}

impl RootResolver {
    /// Create a resolver backed by the real filesystem
    pub fn new(marker: impl Into<String>) -> Self {
        Self::with_probe(marker, StdFs)
    }
}

impl<P: FileProbe> RootResolver<P> {
    /// Create a resolver with a custom filesystem probe
    pub fn with_probe(marker: impl Into<String>, probe: P) -> Self {
        Self {
            marker: marker.into(),
            probe,
        }
    }

    /// Marker file name
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Return the nearest directory at or above `start` that contains the
    /// marker as a regular file, or `None` once the filesystem root has been
    /// checked.
    pub fn resolve(&self, start: &Path) -> Option<PathBuf> {
        let mut current = absolutize(start);
        let mut previous = PathBuf::new();

        while current != previous {
            let candidate = current.join(&self.marker);
            tracing::debug!("Probing {:?}", candidate);
            if self.probe.is_file(&candidate) {
                return Some(current);
            }

            let parent = parent_or_self(&current);
            previous = std::mem::replace(&mut current, parent);
        }

        tracing::debug!("No {} found above {:?}", self.marker, start);
        None
    }
}

/// Parent directory, where the parent of a root is the root itself
fn parent_or_self(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) => parent.to_path_buf(),
        None => path.to_path_buf(),
    }
}

/// Absolute form of `path` with `.` and `..` folded away, so every step of
/// the walk is a real ancestor of the start.
fn absolutize(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
    };
    normalize(&absolute)
}

fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            // Popping at the root is a no-op, matching `/..` == `/`.
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
