// src/actions/clean.rs

use tracing::info;

use super::{ActionContext, ActionError, BuildAction, WrittenFileSet};

/// Removes the destination root. A missing root is fine.
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanAction;

impl BuildAction for CleanAction {
    fn run(&self, ctx: &ActionContext) -> Result<WrittenFileSet, ActionError> {
        let destination = ctx.resolve(&ctx.paths.destination);
        info!(path = %destination.display(), "removing destination tree");
        ctx.fs()
            .remove_dir_all(&destination)
            .map_err(|e| ActionError::filesystem(&destination, e))?;
        Ok(WrittenFileSet::new())
    }
}
