//! Filesystem predicates.

use std::path::Path;

/// Check if the provided path exists and is a directory
pub fn is_dir(path: &Path) -> bool {
    path.exists() && path.is_dir()
}

/// Check if the provided path exists and is a file
pub fn is_file(path: &Path) -> bool {
    path.exists() && path.is_file()
}

/// Filesystem probe used during root discovery
pub trait FileProbe {
    fn is_file(&self, path: &Path) -> bool;
}

/// Probe backed by the real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFs;

impl FileProbe for StdFs {
    fn is_file(&self, path: &Path) -> bool {
        is_file(path)
    }
}
