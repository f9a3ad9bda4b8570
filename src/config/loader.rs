// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation (absolute paths, valid globs, etc.). Use [`load_and_validate`]
/// for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run basic validation.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks for:
///   - at least one watch,
///   - absolute watch paths with no duplicates,
///   - compilable exclude globs,
///   - a sane poll interval.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Helper to resolve a default config path.
///
/// Currently this just returns `Pollwatch.toml` in the current working
/// directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Pollwatch.toml")
}
