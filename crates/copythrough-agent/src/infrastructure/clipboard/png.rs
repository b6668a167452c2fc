//! PNG conversion for image payloads.
//!
//! The platform clipboard hands out raw RGBA buffers; on the wire images
//! travel as PNG so the payload carries its own dimensions.

use std::io::Cursor;

use copythrough_core::ClipboardFormat;
use image::{ImageFormat, RgbaImage};

use crate::application::ports::ClipboardError;

/// A decoded RGBA image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaFrame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

fn invalid(reason: impl ToString) -> ClipboardError {
    ClipboardError::InvalidPayload {
        format: ClipboardFormat::Image,
        reason: reason.to_string(),
    }
}

/// Encodes an RGBA buffer as PNG.
///
/// # Errors
///
/// Returns [`ClipboardError::InvalidPayload`] if the buffer length does not
/// match `width * height * 4` or the encoder fails.
pub fn encode_png(frame: RgbaFrame) -> Result<Vec<u8>, ClipboardError> {
    let img = RgbaImage::from_raw(frame.width, frame.height, frame.rgba)
        .ok_or_else(|| invalid("RGBA buffer does not match image dimensions"))?;
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).map_err(invalid)?;
    Ok(out.into_inner())
}

/// Decodes PNG bytes into an RGBA buffer.
///
/// # Errors
///
/// Returns [`ClipboardError::InvalidPayload`] if the bytes are not a PNG.
pub fn decode_png(bytes: &[u8]) -> Result<RgbaFrame, ClipboardError> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .map_err(invalid)?
        .to_rgba8();
    Ok(RgbaFrame {
        width: img.width(),
        height: img.height(),
        rgba: img.into_raw(),
    })
}
