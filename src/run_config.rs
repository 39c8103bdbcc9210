mod plugins_config;
mod solver_config;

pub use plugins_config::PluginsConfig;
pub use solver_config::{FullSolverConfig, SolverRunConfig, UnseededSolverConfig};

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

/// Upgrades a partial config into its fully specified form.
pub trait Fix<CorrectType> {
    fn to_fixed(&self) -> CorrectType;
}

/// A complete run description: solver parameters plus the plugins to
/// attach, loadable from a YAML or RON file.
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct RunConfig {
    pub solver: SolverRunConfig,
    pub plugins: PluginsConfig,
}

impl RunConfig {
    pub fn from_file(path: &Path) -> Result<Self, RunConfigError> {
        enum Format {
            Yaml,
            Ron,
        }

        let format = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Format::Yaml,
            Some("ron") => Format::Ron,
            other => {
                return Err(RunConfigError::UnsupportedFormat(
                    other.unwrap_or("<none>").to_string(),
                ))
            }
        };

        let raw = fs::read_to_string(path).map_err(RunConfigError::Io)?;
        match format {
            Format::Yaml => {
                serde_yaml::from_str(&raw).map_err(|e| RunConfigError::Parse(e.to_string()))
            }
            Format::Ron => {
                ron::de::from_str(&raw).map_err(|e| RunConfigError::Parse(e.to_string()))
            }
        }
    }
}

#[derive(Debug)]
pub enum RunConfigError {
    Io(std::io::Error),
    Parse(String),
    UnsupportedFormat(String),
    InvalidPluginConfig(String),
}

impl fmt::Display for RunConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(error) => write!(f, "{}", error),
            Self::Parse(msg) => write!(f, "Config could not be parsed: {}", msg),
            Self::UnsupportedFormat(ext) => {
                write!(f, "'{}' is not a supported config format.", ext)
            }
            Self::InvalidPluginConfig(msg) => write!(f, "{}", msg),
        }
    }
}

impl Error for RunConfigError {}
