// src/transform/image.rs

//! Lossless-ish image recompression for publish builds.

use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ColorType, DynamicImage, ImageFormat, ImageResult};

pub const JPEG_QUALITY: u8 = 85;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    /// Anything we copy as-is (GIF, unknown extensions).
    Passthrough,
}

impl ImageKind {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("png") => ImageKind::Png,
            Some("jpg" | "jpeg") => ImageKind::Jpeg,
            _ => ImageKind::Passthrough,
        }
    }
}

/// Outcome of [`compress`]: the bytes to write and whether they were re-encoded.
#[derive(Debug)]
pub struct Compressed {
    pub bytes: Vec<u8>,
    pub reencoded: bool,
}

/// Re-encode `source` and keep the result only if it is strictly smaller.
///
/// Undecodable input is returned unchanged; the output is never larger than
/// the input.
pub fn compress(kind: ImageKind, source: &[u8]) -> Compressed {
    let attempt = match kind {
        ImageKind::Png => recompress_png(source),
        ImageKind::Jpeg => recompress_jpeg(source),
        ImageKind::Passthrough => return verbatim(source),
    };

    match attempt {
        Ok(bytes) if bytes.len() < source.len() => Compressed {
            bytes,
            reencoded: true,
        },
        Ok(_) => verbatim(source),
        Err(err) => {
            tracing::debug!(error = %err, ?kind, "image could not be re-encoded; copying verbatim");
            verbatim(source)
        }
    }
}

fn verbatim(source: &[u8]) -> Compressed {
    Compressed {
        bytes: source.to_vec(),
        reencoded: false,
    }
}

fn recompress_png(source: &[u8]) -> ImageResult<Vec<u8>> {
    let img = image::load_from_memory_with_format(source, ImageFormat::Png)?;
    let mut buf = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut buf, CompressionType::Best, FilterType::Adaptive);
    img.write_with_encoder(encoder)?;
    Ok(buf)
}

fn recompress_jpeg(source: &[u8]) -> ImageResult<Vec<u8>> {
    let img = image::load_from_memory_with_format(source, ImageFormat::Jpeg)?;
    // The JPEG encoder has no alpha channel; keep grayscale as grayscale.
    let img = match img.color() {
        ColorType::L8 | ColorType::L16 => DynamicImage::ImageLuma8(img.to_luma8()),
        _ => DynamicImage::ImageRgb8(img.to_rgb8()),
    };
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
    img.write_with_encoder(encoder)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::io::Cursor;

    fn flat_png_fast() -> Vec<u8> {
        let img = RgbImage::from_pixel(64, 64, Rgb([200, 40, 40]));
        let mut buf = Vec::new();
        let encoder =
            PngEncoder::new_with_quality(&mut buf, CompressionType::Fast, FilterType::NoFilter);
        DynamicImage::ImageRgb8(img).write_with_encoder(encoder).unwrap();
        buf
    }

    #[test]
    fn kind_is_taken_from_the_extension() {
        assert_eq!(ImageKind::from_path(Path::new("a/b.PNG")), ImageKind::Png);
        assert_eq!(ImageKind::from_path(Path::new("b.jpg")), ImageKind::Jpeg);
        assert_eq!(ImageKind::from_path(Path::new("b.gif")), ImageKind::Passthrough);
    }

    #[test]
    fn png_output_is_never_larger_than_input() {
        let source = flat_png_fast();
        let out = compress(ImageKind::Png, &source);
        assert!(out.bytes.len() <= source.len());
        // Still a valid PNG either way.
        image::load_from_memory_with_format(&out.bytes, ImageFormat::Png).unwrap();
    }

    #[test]
    fn jpeg_is_reencoded_and_decodable() {
        let img = RgbImage::from_fn(32, 32, |x, y| Rgb([(x * 8) as u8, (y * 8) as u8, 128]));
        let mut source = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut source), ImageFormat::Jpeg)
            .unwrap();

        let out = compress(ImageKind::Jpeg, &source);
        assert!(out.bytes.len() <= source.len());
        image::load_from_memory_with_format(&out.bytes, ImageFormat::Jpeg).unwrap();
    }

    #[test]
    fn undecodable_input_is_copied_verbatim() {
        let garbage = b"definitely not a png".to_vec();
        let out = compress(ImageKind::Png, &garbage);
        assert_eq!(out.bytes, garbage);
        assert!(!out.reencoded);
    }

    #[test]
    fn gif_is_passed_through() {
        let bytes = b"GIF89a....".to_vec();
        let out = compress(ImageKind::Passthrough, &bytes);
        assert_eq!(out.bytes, bytes);
    }
}
