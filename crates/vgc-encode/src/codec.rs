//! PNG/JPEG encoding
//!
//! Dispatches on the requested MIME type. PNG uses the encoder's
//! default compression; JPEG quality comes from a caller-supplied
//! factor in [0, 1] scaled to [0, 100], with a fixed default when the
//! factor is out of range.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::EncodeError;
use crate::surface::ImageSurface;

/// JPEG quality used when the encoder options are out of range.
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Encode target. Unrecognized MIME strings are not an error; they
/// silently downgrade to PNG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeType {
    Png,
    Jpeg,
}

impl MimeType {
    pub fn parse(mime: &str) -> Self {
        match mime {
            "image/png" => Self::Png,
            "image/jpeg" => Self::Jpeg,
            other => {
                tracing::debug!("unsupported image type {:?}, falling back to PNG", other);
                Self::Png
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// Map the caller's [0, 1] quality factor onto the codec's [0, 100]
/// scale.
fn jpeg_quality(encoder_options: f32) -> u8 {
    if (0.0..=1.0).contains(&encoder_options) {
        (encoder_options * 100.0) as u8
    } else {
        DEFAULT_JPEG_QUALITY
    }
}

/// Encode a surface into a PNG or JPEG container.
pub fn encode(
    surface: &ImageSurface,
    mime: MimeType,
    encoder_options: f32,
) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::new();

    match mime {
        MimeType::Png => {
            PngEncoder::new(&mut out).write_image(
                surface.data(),
                surface.width(),
                surface.height(),
                ExtendedColorType::Rgba8,
            )?;
        }
        MimeType::Jpeg => {
            // the codec wants RGB, alpha is dropped here
            let rgb = surface.to_rgb();
            JpegEncoder::new_with_quality(&mut out, jpeg_quality(encoder_options)).write_image(
                &rgb,
                surface.width(),
                surface.height(),
                ExtendedColorType::Rgb8,
            )?;
        }
    }

    Ok(out)
}
