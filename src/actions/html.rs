// src/actions/html.rs

use tracing::{debug, error};

use crate::transform::include::FileIncluder;

use super::{ActionContext, ActionError, BuildAction, WrittenFileSet, for_each_source};

/// Expands `@@include` directives in every page and writes the pages to the
/// destination root.
///
/// A page that is not UTF-8, or whose includes cannot be resolved, is logged
/// and skipped; the other pages are still written.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlAction;

impl BuildAction for HtmlAction {
    fn run(&self, ctx: &ActionContext) -> Result<WrittenFileSet, ActionError> {
        let includer = FileIncluder::new(ctx.resolve(&ctx.paths.include_dir))
            .map_err(|e| ActionError::Pattern(e.to_string()))?;

        for_each_source(ctx, &ctx.paths.html, |page| {
            let bytes = ctx.read(&page.path)?;
            let source = match String::from_utf8(bytes) {
                Ok(source) => source,
                Err(err) => {
                    error!(page = %page.path.display(), error = %err, "skipping page that is not UTF-8");
                    return Ok(Vec::new());
                }
            };

            let expanded = match includer.expand(ctx.fs(), &source) {
                Ok(html) => html,
                Err(err) => {
                    error!(page = %page.path.display(), error = %err, "skipping page");
                    return Ok(Vec::new());
                }
            };

            let target = ctx.paths.destination.join(&page.relative);
            debug!(page = %page.relative.display(), "writing page");
            Ok(vec![ctx.write(&target, expanded.as_bytes())?])
        })
    }
}
