//! Configuration file discovery for the CLI
//!
//! An explicit `--config` path always wins and must exist. Otherwise the
//! candidates from [`search_paths`] are tried in order and the first file
//! that exists is loaded; with none present the defaults apply. Keys missing
//! from a file keep their default values.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use astrolabe::{AstrolabeError, config::ExportConfig};

/// Path of the project-local configuration file, relative to the working directory.
pub const LOCAL_CONFIG: &str = "astrolabe/config.toml";

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Failed to read configuration {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),
}

impl From<ConfigError> for AstrolabeError {
    fn from(err: ConfigError) -> Self {
        AstrolabeError::Config(err.to_string())
    }
}

/// Where a configuration file came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit,
    Local,
    System,
}

/// Candidate configuration files in lookup order, without the explicit path.
pub fn search_paths() -> Vec<(ConfigSource, PathBuf)> {
    let mut paths = vec![(ConfigSource::Local, PathBuf::from(LOCAL_CONFIG))];
    match ProjectDirs::from("com", "astrolabe", "astrolabe") {
        Some(dirs) => paths.push((ConfigSource::System, dirs.config_dir().join("config.toml"))),
        None => debug!("Could not determine platform-specific config directory"),
    }
    paths
}

/// Picks the configuration file to load, if any.
///
/// An explicit path is returned whether or not it exists, so that a typo in
/// `--config` surfaces as an error instead of silently falling back.
pub fn locate(explicit_path: Option<&Path>) -> Option<(ConfigSource, PathBuf)> {
    if let Some(path) = explicit_path {
        return Some((ConfigSource::Explicit, path.to_path_buf()));
    }

    search_paths().into_iter().find(|(source, path)| {
        let found = path.exists();
        if !found {
            debug!(source:?, path = path.display().to_string(); "Configuration file not found");
        }
        found
    })
}

/// Locates and loads the export configuration.
///
/// # Errors
///
/// Returns [`AstrolabeError::Config`] when an explicit path does not exist,
/// or when the chosen file cannot be read or parsed.
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<ExportConfig, AstrolabeError> {
    let explicit_path: Option<&Path> = explicit_path.as_ref().map(|path| path.as_ref());
    let Some((source, path)) = locate(explicit_path) else {
        debug!("No configuration file found, using default configuration");
        return Ok(ExportConfig::default());
    };

    info!(source:?, path = path.display().to_string(); "Loading configuration");
    Ok(read_config(&path)?)
}

fn read_config(path: &Path) -> Result<ExportConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
