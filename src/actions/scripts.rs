// src/actions/scripts.rs

use tracing::warn;

use crate::transform::lint::{format_stylish, lint};

use super::{ActionContext, ActionError, BuildAction, WrittenFileSet, for_each_source};

/// Lints each script, reports problems as warnings, and copies the script
/// unchanged. Lint findings never fail the task.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptsAction;

impl BuildAction for ScriptsAction {
    fn run(&self, ctx: &ActionContext) -> Result<WrittenFileSet, ActionError> {
        for_each_source(ctx, &ctx.paths.scripts, |file| {
            let bytes = ctx.read(&file.path)?;

            let violations = lint(&String::from_utf8_lossy(&bytes));
            if !violations.is_empty() {
                let shown = file.path.display().to_string();
                warn!(
                    file = %shown,
                    warnings = violations.len(),
                    "\n{}",
                    format_stylish(&shown, &violations)
                );
            }

            let target = ctx.paths.js_dir.join(&file.relative);
            Ok(vec![ctx.write(&target, &bytes)?])
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use super::*;
    use crate::config::{BuildMode, PathSet};
    use crate::fs::FileSystem;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn scripts_with_lint_warnings_are_still_copied() {
        let fs = Arc::new(MockFileSystem::new());
        let source = "if (a == b) { debugger; }\n";
        fs.add_file("site/src/assets/js/main.js", source);
        let ctx = ActionContext::new("site", PathSet::resolve(BuildMode::Development), fs.clone());

        let written = ScriptsAction.run(&ctx).unwrap();

        assert_eq!(written.paths(), vec!["assets/js/main.js"]);
        let copied = fs
            .read_to_string(Path::new("site/build/development/assets/js/main.js"))
            .unwrap();
        assert_eq!(copied, source);
    }
}
