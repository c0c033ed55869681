// src/actions/images.rs

use tracing::debug;

use crate::transform::image::{ImageKind, compress};

use super::{ActionContext, ActionError, BuildAction, WrittenFileSet, for_each_source};

/// Copies images, re-encoding PNG and JPEG in publish mode when that makes
/// them smaller.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImagesAction;

impl BuildAction for ImagesAction {
    fn run(&self, ctx: &ActionContext) -> Result<WrittenFileSet, ActionError> {
        let compress_images = ctx.paths.compress_images;

        for_each_source(ctx, &ctx.paths.images, |file| {
            let source = ctx.read(&file.path)?;
            let target = ctx.paths.img_dir.join(&file.relative);

            if !compress_images {
                return Ok(vec![ctx.write(&target, &source)?]);
            }

            let out = compress(ImageKind::from_path(&file.path), &source);
            debug!(
                file = %file.relative.display(),
                before = source.len(),
                after = out.bytes.len(),
                reencoded = out.reencoded,
                "image processed"
            );
            Ok(vec![ctx.write(&target, &out.bytes)?])
        })
    }
}
