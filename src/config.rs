//! Application configuration management.
//!
//! Settings are layered with figment, later layers overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. TOML file (`<config dir>/broom/config.toml`, or `--config <PATH>`)
//! 3. `BROOM_*` environment variables, nested with `__`
//!    (`BROOM_SAMPLING__PIECE_SIZE=32`)
//! 4. CLI flags, applied by the caller
//!
//! ```toml
//! ignore_empty = false
//! output_dir = "."
//! skip_hidden = false
//!
//! [sampling]
//! piece_size = 24
//! piece_count = 3
//! ```

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::scanner::SamplingConfig;

/// Prefix of environment variables read into the configuration.
pub const ENV_PREFIX: &str = "BROOM_";

/// Errors that can occur while loading or saving configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// A layer could not be parsed or has the wrong shape.
    #[error("Invalid configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    /// The configuration parsed but holds values broom cannot use.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// The configuration could not be serialized.
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The configuration file could not be written.
    #[error("Failed to write configuration to {path}: {source}")]
    Io {
        /// Path of the configuration file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A configuration file named explicitly does not exist.
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How files are sampled into fingerprints.
    pub sampling: SamplingConfig,
    /// Leave empty files in place when sweeping.
    pub ignore_empty: bool,
    /// Directory the results file is written to.
    pub output_dir: PathBuf,
    /// Skip hidden files and directories while tracking.
    pub skip_hidden: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sampling: SamplingConfig::default(),
            ignore_empty: false,
            output_dir: PathBuf::from("."),
            skip_hidden: false,
        }
    }
}

impl Config {
    /// Load the configuration.
    ///
    /// Reads `path` if given, otherwise the default platform path. Only the
    /// default file may be missing; its layer is then simply empty.
    ///
    /// The result is not validated here, so that command-line flags can
    /// still correct it. Call [`Config::validate`] once they are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if `path` does not exist, or
    /// [`ConfigError::Extract`] if a layer cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            if !path.is_file() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
        }
        let file = path.map(Path::to_path_buf).or_else(Self::config_path);
        let config: Self = Self::figment(file.as_deref())
            .extract()
            .map_err(Box::new)?;
        log::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Load the configuration from a specific file.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        Self::load(Some(path))
    }

    /// The layered provider behind [`Config::load`].
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Reject values the pipeline cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if either sampling parameter is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sampling.piece_size == 0 {
            return Err(ConfigError::Invalid(
                "sampling.piece_size must be greater than 0".to_string(),
            ));
        }
        if self.sampling.piece_count == 0 {
            return Err(ConfigError::Invalid(
                "sampling.piece_count must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Save the configuration as TOML to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if serialization or writing fails.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(io_error)?;
        log::info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Get the default platform-specific configuration path.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "broom").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
