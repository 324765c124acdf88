use std::path::Path;

use serde::{Deserialize, Serialize};

use cma_blocks::{TraversalDirection, TraversalOptions};

use crate::error::SdkResult;

/// Session configuration, usually loaded from a TOML file.
///
/// ```toml
/// [traversal]
/// direction = "descendant_first"
///
/// [schema]
/// prefetch_entity_types = true
///
/// [log]
/// level = "debug"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkConfig {
    #[serde(default)]
    pub traversal: TraversalConfig,
    #[serde(default)]
    pub schema: SchemaConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalConfig {
    /// Order of the recursive map and filter operations.
    #[serde(default)]
    pub direction: TraversalDirection,
}

/// What a session loads eagerly when it starts. Anything not prefetched is
/// loaded on first use.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub prefetch_entity_types: bool,
    /// Also load the fields of every entity type. Implies
    /// `prefetch_entity_types`.
    #[serde(default)]
    pub prefetch_fields: bool,
    #[serde(default)]
    pub prefetch_plugins: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Maximum level: `trace`, `debug`, `info`, `warn`, or `error`.
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl SdkConfig {
    /// Parse a TOML document. Missing sections take their defaults.
    pub fn from_toml_str(source: &str) -> SdkResult<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn to_toml_string(&self) -> SdkResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> SdkResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> SdkResult<()> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn traversal_options(&self) -> TraversalOptions {
        TraversalOptions::default().with_direction(self.traversal.direction)
    }

    pub fn with_direction(mut self, direction: TraversalDirection) -> Self {
        self.traversal.direction = direction;
        self
    }
}
