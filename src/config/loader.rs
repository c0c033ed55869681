// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::config::model::{RawSiteConfig, SiteConfig};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw
/// `RawSiteConfig`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawSiteConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawSiteConfig = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<SiteConfig> {
    let raw_config = load_from_path(&path)?;
    let config = SiteConfig::try_from(raw_config)?;
    Ok(config)
}

/// Load the site config if the file exists, otherwise fall back to the
/// built-in defaults.
///
/// A file that exists but fails to parse or validate is still an error.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<SiteConfig> {
    let path = path.as_ref();
    if path.is_file() {
        info!(path = %path.display(), "loading site config");
        load_and_validate(path)
    } else {
        debug!(path = %path.display(), "no site config file; using defaults");
        Ok(SiteConfig::default())
    }
}
