//! `package.json` loader.

use super::fs::is_file;
use super::resolver::DEFAULT_MARKER;
use crate::error::{ManifestError, ManifestResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// The subset of `package.json` scripts care about
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PackageManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub scripts: BTreeMap<String, String>,
}

impl PackageManifest {
    /// Load `<dir>/package.json`
    pub fn load(dir: &Path) -> ManifestResult<Self> {
        let path = dir.join(DEFAULT_MARKER);
        if !is_file(&path) {
            return Err(ManifestError::NotFound(path));
        }

        let contents = fs::read_to_string(&path).map_err(|source| ManifestError::Io {
            path: path.clone(),
            source,
        })?;

        serde_json::from_str(&contents).map_err(|e| ManifestError::Parse {
            path,
            message: e.to_string(),
        })
    }

    /// Look up a named script
    pub fn script(&self, name: &str) -> Option<&str> {
        self.scripts.get(name).map(String::as_str)
    }
}
