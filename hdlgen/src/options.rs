//! Generation options and the optional TOML configuration file they can be read from.

use crate::hdl::Dialect;

use serde::Deserialize;
use thiserror::Error;

use std::fs;
use std::path::{Path, PathBuf};

/// How sequential components are clocked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockMode {
    /// Every clock tree drives its registers directly.
    #[default]
    Derived,
    /// All registers run on one external clock and use a clock tree's tick as clock enable.
    GlobalTick,
}

/// Options for one generation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationOptions {
    pub dialect: Dialect,
    pub output_dir: PathBuf,
    pub clock_mode: ClockMode,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        GenerationOptions {
            dialect: Dialect::Vhdl,
            output_dir: PathBuf::from("hdl_out"),
            clock_mode: ClockMode::Derived,
        }
    }
}

/// Dialect selection as it appears in configuration, where both dialects may be requested at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectChoice {
    Vhdl,
    Verilog,
    Both,
}

impl DialectChoice {
    pub fn dialects(self) -> Vec<Dialect> {
        match self {
            DialectChoice::Vhdl => vec![Dialect::Vhdl],
            DialectChoice::Verilog => vec![Dialect::Verilog],
            DialectChoice::Both => Dialect::ALL.to_vec(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Contents of a configuration file. Every field is optional; command-line flags take precedence.
///
/// ```toml
/// dialect = "both"
/// output_dir = "build/hdl"
/// clock_mode = "global_tick"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub dialect: Option<DialectChoice>,
    pub output_dir: Option<PathBuf>,
    pub clock_mode: Option<ClockMode>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<ConfigFile, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ConfigFile::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<ConfigFile, toml::de::Error> {
        toml::from_str(text)
    }
}
