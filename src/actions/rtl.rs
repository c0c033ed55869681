// src/actions/rtl.rs

use std::path::Path;

use tracing::{info, warn};

use crate::transform::rtl::mirror;

use super::{ActionContext, ActionError, BuildAction, WrittenFileSet};

/// Writes a right-to-left twin (`<stem>.rtl.css`) of the configured stylesheet.
///
/// The input is an output of `styles`. When it is missing the action logs a
/// warning and succeeds without writing anything, so the rest of the build
/// keeps going.
#[derive(Debug, Clone, Copy, Default)]
pub struct RtlStylesAction;

impl BuildAction for RtlStylesAction {
    fn run(&self, ctx: &ActionContext) -> Result<WrittenFileSet, ActionError> {
        let source_rel = ctx.paths.css_dir.join(&ctx.paths.rtl_source);
        let source = ctx.resolve(&source_rel);

        if !ctx.fs().is_file(&source) {
            warn!(
                path = %source.display(),
                "RTL source stylesheet not found; skipping RTL generation"
            );
            return Ok(WrittenFileSet::new());
        }

        let css = ctx
            .fs()
            .read_to_string(&source)
            .map_err(|e| ActionError::filesystem(&source, e))?;
        let mirrored = mirror(&css);

        let target = ctx.paths.css_dir.join(rtl_file_name(&ctx.paths.rtl_source));
        let written = ctx.write(&target, mirrored.as_bytes())?;
        info!(path = %written.path.display(), "wrote RTL stylesheet");

        Ok([written].into_iter().collect())
    }
}

/// `listty.css` -> `listty.rtl.css`.
pub fn rtl_file_name(source: &str) -> String {
    let path = Path::new(source);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(source);
    format!("{stem}.rtl.css")
}
