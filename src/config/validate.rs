// src/config/validate.rs

use globset::Glob;

use crate::config::model::{RawSiteConfig, SiteConfig};
use crate::errors::{Result, SiteBuildError};

impl TryFrom<RawSiteConfig> for SiteConfig {
    type Error = SiteBuildError;

    fn try_from(raw: RawSiteConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(SiteConfig::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawSiteConfig) -> Result<()> {
    validate_globs(cfg)?;
    validate_output(cfg)?;
    validate_server(cfg)?;
    validate_styles(cfg)?;
    Ok(())
}

fn validate_globs(cfg: &RawSiteConfig) -> Result<()> {
    let p = &cfg.paths;
    let globs = [
        ("html", &p.html),
        ("html_includes", &p.html_includes),
        ("plugins", &p.plugins),
        ("scripts", &p.scripts),
        ("styles", &p.styles),
        ("images", &p.images),
    ];

    for (key, pattern) in globs {
        if pattern.trim().is_empty() {
            return Err(SiteBuildError::ConfigError(format!(
                "[paths].{key} must not be empty"
            )));
        }
        Glob::new(pattern).map_err(|e| {
            SiteBuildError::ConfigError(format!(
                "[paths].{key} is not a valid glob '{pattern}': {e}"
            ))
        })?;
    }

    if p.include_dir.trim().is_empty() {
        return Err(SiteBuildError::ConfigError(
            "[paths].include_dir must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_output(cfg: &RawSiteConfig) -> Result<()> {
    for (key, dir) in [
        ("development", &cfg.output.development),
        ("publish", &cfg.output.publish),
    ] {
        if dir.trim().is_empty() {
            return Err(SiteBuildError::ConfigError(format!(
                "[output].{key} must not be empty"
            )));
        }
    }

    if cfg.output.development == cfg.output.publish {
        return Err(SiteBuildError::ConfigError(format!(
            "[output].development and [output].publish must differ (both are '{}')",
            cfg.output.development
        )));
    }

    Ok(())
}

fn validate_server(cfg: &RawSiteConfig) -> Result<()> {
    if cfg.server.development_port == 0 || cfg.server.publish_port == 0 {
        return Err(SiteBuildError::ConfigError(
            "[server] ports must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_styles(cfg: &RawSiteConfig) -> Result<()> {
    let name = cfg.styles.rtl_source.as_str();
    let is_bare_name = !name.is_empty() && !name.contains('/') && !name.contains('\\');
    if !is_bare_name || !name.ends_with(".css") {
        return Err(SiteBuildError::ConfigError(format!(
            "[styles].rtl_source must be a bare .css file name (got '{name}')"
        )));
    }
    Ok(())
}
