//! Conversion of submitted image data to tightly packed RGBA8.

use crate::error::ImageError;

/// Layout of the blob sent with an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// A complete encoded file (PNG, JPEG, GIF, BMP).
    Encoded,
    Gray,
    GrayAlpha,
    Rgb,
    Rgba,
}

impl PixelFormat {
    /// Bytes per pixel of a raw format; `None` for encoded files.
    pub fn channels(self) -> Option<usize> {
        match self {
            PixelFormat::Encoded => None,
            PixelFormat::Gray => Some(1),
            PixelFormat::GrayAlpha => Some(2),
            PixelFormat::Rgb => Some(3),
            PixelFormat::Rgba => Some(4),
        }
    }
}

impl TryFrom<u32> for PixelFormat {
    type Error = ImageError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PixelFormat::Encoded),
            1 => Ok(PixelFormat::Gray),
            2 => Ok(PixelFormat::GrayAlpha),
            3 => Ok(PixelFormat::Rgb),
            4 => Ok(PixelFormat::Rgba),
            other => Err(ImageError::UnknownFormat(other)),
        }
    }
}

/// Expand `blob` to RGBA8 in R, G, B, A order.
///
/// Gray is copied into all three color channels and missing alpha becomes
/// opaque. Raw blobs must be exactly `width * height * channels` bytes and
/// encoded files must decode to exactly `width x height`.
pub fn to_rgba(
    format: PixelFormat,
    width: u32,
    height: u32,
    blob: Vec<u8>,
) -> Result<Vec<u8>, ImageError> {
    let Some(channels) = format.channels() else {
        return decode_file(width, height, &blob);
    };

    let pixel_count = (width as usize).saturating_mul(height as usize);
    let expected = pixel_count.saturating_mul(channels);
    if blob.len() != expected {
        return Err(ImageError::SizeMismatch {
            expected,
            actual: blob.len(),
        });
    }

    if format == PixelFormat::Rgba {
        return Ok(blob);
    }

    let size = pixel_count * 4;
    let mut out = Vec::new();
    out.try_reserve_exact(size)
        .map_err(|_| ImageError::AllocationFailed { size })?;

    for px in blob.chunks_exact(channels) {
        out.extend_from_slice(&expand_pixel(px)?);
    }
    Ok(out)
}

fn expand_pixel(px: &[u8]) -> Result<[u8; 4], ImageError> {
    match *px {
        [g] => Ok([g, g, g, 0xFF]),
        [g, a] => Ok([g, g, g, a]),
        [r, g, b] => Ok([r, g, b, 0xFF]),
        _ => Err(ImageError::ChannelCount(px.len())),
    }
}

fn decode_file(width: u32, height: u32, blob: &[u8]) -> Result<Vec<u8>, ImageError> {
    let decoded = ::image::load_from_memory(blob)?.to_rgba8();
    if decoded.width() != width || decoded.height() != height {
        return Err(ImageError::DimensionMismatch {
            width,
            height,
            actual_width: decoded.width(),
            actual_height: decoded.height(),
        });
    }
    Ok(decoded.into_raw())
}
