// src/config/model.rs

use serde::Deserialize;

/// Site configuration as read from an (optional) TOML file.
///
/// Every field has a default, so an empty file (or no file at all) yields the
/// stock layout:
///
/// ```toml
/// [paths]
/// html = "src/*.html"
/// html_includes = "src/_inc/**/*.htm"
/// include_dir = "src/_inc/"
/// plugins = "src/assets/plugins/**/*.*"
/// scripts = "src/assets/js/*.*"
/// styles = "src/assets/scss/**/*.scss"
/// images = "src/assets/img/**/*.{png,jpg,gif}"
///
/// [output]
/// development = "build/development/"
/// publish = "build/publish/"
///
/// [server]
/// development_port = 8080
/// publish_port = 8000
///
/// [styles]
/// rtl_source = "listty.css"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSiteConfig {
    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub output: OutputSection,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub styles: StylesSection,
}

/// Validated site configuration.
///
/// Only constructed through `TryFrom<RawSiteConfig>` (see `validate.rs`) or
/// `Default`, which is known to be valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub paths: PathsSection,
    pub output: OutputSection,
    pub server: ServerSection,
    pub styles: StylesSection,
}

impl SiteConfig {
    pub(crate) fn new_unchecked(raw: RawSiteConfig) -> Self {
        Self {
            paths: raw.paths,
            output: raw.output,
            server: raw.server,
            styles: raw.styles,
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self::new_unchecked(RawSiteConfig::default())
    }
}

/// `[paths]` section: source globs, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsSection {
    /// Top-level HTML pages.
    pub html: String,
    /// HTML fragments pulled in by `@@include`; watched but not written.
    pub html_includes: String,
    /// Base directory `@@include('...')` paths are resolved against.
    pub include_dir: String,
    /// Third-party asset tree copied verbatim.
    pub plugins: String,
    pub scripts: String,
    pub styles: String,
    pub images: String,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            html: "src/*.html".to_string(),
            html_includes: "src/_inc/**/*.htm".to_string(),
            include_dir: "src/_inc/".to_string(),
            plugins: "src/assets/plugins/**/*.*".to_string(),
            scripts: "src/assets/js/*.*".to_string(),
            styles: "src/assets/scss/**/*.scss".to_string(),
            images: "src/assets/img/**/*.{png,jpg,gif}".to_string(),
        }
    }
}

/// `[output]` section: destination roots per build mode.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSection {
    pub development: String,
    pub publish: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            development: "build/development/".to_string(),
            publish: "build/publish/".to_string(),
        }
    }
}

/// `[server]` section: dev-server ports per build mode.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub development_port: u16,
    pub publish_port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            development_port: 8080,
            publish_port: 8000,
        }
    }
}

/// `[styles]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StylesSection {
    /// Compiled stylesheet (inside `assets/css/`) that gets an RTL twin.
    pub rtl_source: String,
}

impl Default for StylesSection {
    fn default() -> Self {
        Self {
            rtl_source: "listty.css".to_string(),
        }
    }
}
