// src/config/paths.rs

//! Build-mode dependent path resolution.
//!
//! [`PathSet::resolve`] is a pure function of the [`BuildMode`] (and, through
//! [`PathSet::resolve_with`], the site config). Everything downstream (actions,
//! watch bindings, the dev server) reads paths from the resulting value.

use std::fmt;
use std::path::PathBuf;

use crate::config::model::SiteConfig;

/// Development vs publish build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BuildMode {
    #[default]
    Development,
    Publish,
}

impl BuildMode {
    pub fn is_publish(self) -> bool {
        matches!(self, BuildMode::Publish)
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildMode::Development => f.write_str("development"),
            BuildMode::Publish => f.write_str("publish"),
        }
    }
}

/// Resolved source globs and destination directories for one build mode.
///
/// Globs are relative to the project root; destination directories are
/// relative to the project root as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSet {
    pub mode: BuildMode,

    pub html: String,
    pub html_includes: String,
    pub include_dir: PathBuf,
    pub plugins: String,
    pub scripts: String,
    pub styles: String,
    pub images: String,

    /// Destination root (`build/development/` or `build/publish/`).
    pub destination: PathBuf,
    pub css_dir: PathBuf,
    pub js_dir: PathBuf,
    pub img_dir: PathBuf,
    pub plugins_dir: PathBuf,

    /// File name inside `css_dir` that receives an RTL twin.
    pub rtl_source: String,

    pub source_maps: bool,
    pub compress_images: bool,
    pub port: u16,
}

impl PathSet {
    /// Resolve the stock layout for `mode`.
    pub fn resolve(mode: BuildMode) -> Self {
        Self::resolve_with(mode, &SiteConfig::default())
    }

    /// Resolve paths for `mode` using the globs/dirs/ports from `cfg`.
    pub fn resolve_with(mode: BuildMode, cfg: &SiteConfig) -> Self {
        let publish = mode.is_publish();

        let destination = PathBuf::from(if publish {
            &cfg.output.publish
        } else {
            &cfg.output.development
        });
        let assets = destination.join("assets");

        Self {
            mode,
            html: cfg.paths.html.clone(),
            html_includes: cfg.paths.html_includes.clone(),
            include_dir: PathBuf::from(&cfg.paths.include_dir),
            plugins: cfg.paths.plugins.clone(),
            scripts: cfg.paths.scripts.clone(),
            styles: cfg.paths.styles.clone(),
            images: cfg.paths.images.clone(),
            css_dir: assets.join("css"),
            js_dir: assets.join("js"),
            img_dir: assets.join("img"),
            plugins_dir: assets.join("plugins"),
            destination,
            rtl_source: cfg.styles.rtl_source.clone(),
            source_maps: !publish,
            compress_images: publish,
            port: if publish {
                cfg.server.publish_port
            } else {
                cfg.server.development_port
            },
        }
    }
}
