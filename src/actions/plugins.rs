// src/actions/plugins.rs

use tracing::debug;

use super::{ActionContext, ActionError, BuildAction, WrittenFileSet, copy_sources};

/// Copies the vendor plugin tree verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct VendorPluginsAction;

impl BuildAction for VendorPluginsAction {
    fn run(&self, ctx: &ActionContext) -> Result<WrittenFileSet, ActionError> {
        let written = copy_sources(ctx, &ctx.paths.plugins, &ctx.paths.plugins_dir)?;
        debug!(files = written.len(), "copied vendor plugins");
        Ok(written)
    }
}
