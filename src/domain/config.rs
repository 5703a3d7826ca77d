use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::DEFAULT_LINE_LIMIT;

/// Configuration for parsing and encoding GEDCOM documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Whether malformed lines abort the parse.
    ///
    /// When `false`, unrecognisable lines are folded into the previous element
    /// as continuation fragments, level jumps are clamped, and invalid UTF-8
    /// is replaced. The parse always produces a tree.
    pub strict: bool,

    /// Maximum number of characters on one physical line (excluding its
    /// terminator) when values are encoded into `CONC`/`CONT` children.
    line_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strict: true,
            line_limit: DEFAULT_LINE_LIMIT,
        }
    }
}

impl Config {
    /// A default configuration with strict parsing switched off.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            strict: false,
            ..Self::default()
        }
    }

    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the line limit used when encoding multi-line values.
    #[must_use]
    pub const fn line_limit(&self) -> usize {
        self.line_limit
    }

    /// Sets the line limit used when encoding multi-line values.
    ///
    /// Limits below the length of the shortest possible line are still
    /// honoured; every continuation line then carries a single character.
    pub const fn set_line_limit(&mut self, line_limit: usize) {
        self.line_limit = line_limit;
    }
}

const fn default_strict() -> bool {
    true
}

const fn default_line_limit() -> usize {
    DEFAULT_LINE_LIMIT
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_strict")]
        strict: bool,

        /// Maximum characters per physical line when encoding values.
        #[serde(default = "default_line_limit")]
        line_limit: usize,
    },
}

impl From<Versions> for super::Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 { strict, line_limit } => Self { strict, line_limit },
        }
    }
}

impl From<super::Config> for Versions {
    fn from(config: super::Config) -> Self {
        Self::V1 {
            strict: config.strict,
            line_limit: config.line_limit,
        }
    }
}
