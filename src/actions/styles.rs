// src/actions/styles.rs

use std::path::{Component, Path, PathBuf};

use tracing::{debug, error};

use crate::transform::css::{
    append_source_map_comment, autoprefix, compile_scss, is_partial, source_map,
};
use crate::watch::patterns::{MatchedFile, glob_base};

use super::{ActionContext, ActionError, BuildAction, WrittenFile, WrittenFileSet, for_each_source};

/// Compiles every non-partial Sass file, autoprefixes the result and, in
/// development mode, writes a source map next to it.
///
/// A file that fails to compile is logged and skipped; the others are still
/// written.
#[derive(Debug, Clone, Copy, Default)]
pub struct StylesAction;

impl BuildAction for StylesAction {
    fn run(&self, ctx: &ActionContext) -> Result<WrittenFileSet, ActionError> {
        let styles_base = ctx.resolve(glob_base(&ctx.paths.styles));

        for_each_source(ctx, &ctx.paths.styles, |file| {
            if is_partial(&file.path) {
                return Ok(Vec::new());
            }
            compile_one(ctx, file, &styles_base)
        })
    }
}

fn compile_one(
    ctx: &ActionContext,
    file: &MatchedFile,
    styles_base: &Path,
) -> Result<Vec<WrittenFile>, ActionError> {
    let mut load_paths = Vec::with_capacity(2);
    if let Some(dir) = file.path.parent() {
        load_paths.push(dir.to_path_buf());
    }
    load_paths.push(styles_base.to_path_buf());

    let mut css = match compile_scss(ctx.fs(), &file.path, &load_paths) {
        Ok(css) => autoprefix(&css),
        Err(err) => {
            error!(file = %file.path.display(), error = %err, "stylesheet skipped");
            return Ok(Vec::new());
        }
    };

    let css_rel = file.relative.with_extension("css");
    let target = ctx.paths.css_dir.join(&css_rel);
    let mut written = Vec::with_capacity(2);

    if ctx.paths.source_maps {
        let css_name = file_name(&css_rel);
        let map_name = format!("{css_name}.map");

        let source_text = ctx
            .fs()
            .read_to_string(&file.path)
            .map_err(|e| ActionError::filesystem(&file.path, e))?;
        let source_rel = glob_base(&ctx.paths.styles).join(&file.relative);
        let target_dir = target.parent().unwrap_or(Path::new(""));
        let source_ref = relative_from(target_dir, &source_rel);

        let map = source_map(&css_name, &source_ref, &source_text)
            .map_err(|e| ActionError::filesystem(&target, e.into()))?;
        append_source_map_comment(&mut css, &map_name);

        written.push(ctx.write(&target.with_file_name(&map_name), map.as_bytes())?);
    }

    debug!(file = %css_rel.display(), "writing stylesheet");
    written.push(ctx.write(&target, css.as_bytes())?);
    Ok(written)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Path of `target` as seen from `from_dir`, both project-relative.
fn relative_from(from_dir: &Path, target: &Path) -> String {
    let ups = from_dir
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .count();
    let mut rel = PathBuf::new();
    for _ in 0..ups {
        rel.push("..");
    }
    rel.push(target);
    rel.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_reference_climbs_out_of_the_output_dir() {
        let rel = relative_from(
            Path::new("build/development/assets/css"),
            Path::new("src/assets/scss/listty.scss"),
        );
        assert_eq!(rel, "../../../../src/assets/scss/listty.scss");
    }
}
