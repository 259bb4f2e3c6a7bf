//! Configuration management for pkg-script.
//!
//! Supports layered configuration: defaults → user → env

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptConfig {
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub quiet: QuietConfig,
}

impl ScriptConfig {
    /// Load configuration with hierarchy: defaults → user → env
    pub fn load() -> Result<Self, ConfigError> {
        use config::{Config, Environment, File};

        let mut builder = Config::builder();

        // 1. Start with defaults
        builder = builder.add_source(
            config::File::from_str(
                include_str!("../default_config.toml"),
                config::FileFormat::Toml,
            )
            .required(false),
        );

        // 2. User config (~/.config/pkg-script/config.toml)
        if let Some(config_dir) = directories::ProjectDirs::from("com", "pkg-script", "pkg-script")
        {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(File::from(user_config).required(false));
            }
        }

        // 3. Environment variables (PKG_SCRIPT_*)
        builder = builder.add_source(
            Environment::with_prefix("PKG_SCRIPT")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("quiet.aliases"),
        );

        let config = builder
            .build()
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject settings the resolver cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let marker = self.resolver.marker.trim();
        if marker.is_empty() {
            return Err(ConfigError::Invalid(
                "resolver.marker must not be empty".to_string(),
            ));
        }
        if marker.contains('/') || marker.contains('\\') {
            return Err(ConfigError::Invalid(format!(
                "resolver.marker must be a file name, got {:?}",
                marker
            )));
        }
        Ok(())
    }
}

/// Package root discovery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// File whose presence marks a package root
    #[serde(default = "default_marker")]
    pub marker: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            marker: default_marker(),
        }
    }
}

fn default_marker() -> String {
    "package.json".to_string()
}

/// Quiet flag settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuietConfig {
    /// Arguments that switch status output off
    #[serde(default = "default_quiet_aliases")]
    pub aliases: Vec<String>,
}

impl Default for QuietConfig {
    fn default() -> Self {
        Self {
            aliases: default_quiet_aliases(),
        }
    }
}

pub(crate) fn default_quiet_aliases() -> Vec<String> {
    ["quiet", "--quiet", "-q"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
