//! Binary codec for the shared file.
//!
//! Wire format:
//! ```text
//! [magic:2 "CT"][version:1][format:1][origin_len:2][payload_len:4][origin:N][payload:M]
//! ```
//! Total header size: 10 bytes. All multi-byte integers are big-endian.
//!
//! The shared file holds exactly one encoded message, so the decoder insists
//! that the declared lengths account for every byte.  A file observed while a
//! peer is still writing it is reported as
//! [`ProtocolError::PayloadLengthMismatch`] (or `InsufficientData`) rather
//! than decoded into a truncated payload.

use crate::protocol::messages::{
    ClipboardFormat, ClipboardMessage, HEADER_SIZE, MAGIC, PROTOCOL_VERSION,
};
use thiserror::Error;

/// Errors that can occur during message encoding or decoding.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The byte slice is shorter than the fixed header.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// The first two bytes are not the `"CT"` magic.
    #[error("bad magic: 0x{0:02X}{1:02X}")]
    BadMagic(u8, u8),

    /// The protocol version in the header is not supported.
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(u8),

    /// The format byte in the header is not a recognized value.
    #[error("unknown clipboard format: 0x{0:02X}")]
    UnknownFormat(u8),

    /// The declared origin + payload length exceeds the bytes available.
    #[error("payload length mismatch: header declares {declared} bytes, available is {available}")]
    PayloadLengthMismatch { declared: usize, available: usize },

    /// Bytes remain after the declared payload.
    #[error("{0} trailing bytes after message")]
    TrailingBytes(usize),

    /// The origin field could not be parsed.
    #[error("malformed origin: {0}")]
    MalformedOrigin(String),

    /// The origin does not fit the 2-byte length field.
    #[error("origin too long: {0} bytes (max 65535)")]
    OriginTooLong(usize),

    /// The payload does not fit the 4-byte length field.
    #[error("payload too large: {0} bytes")]
    PayloadTooLarge(usize),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes a [`ClipboardMessage`] into the exact bytes of the shared file.
///
/// # Errors
///
/// Returns [`ProtocolError::OriginTooLong`] or
/// [`ProtocolError::PayloadTooLarge`] if a length does not fit its header
/// field.  The origin is never truncated, since a truncated origin would
/// defeat the origin filter on the writing host.
///
/// # Examples
///
/// ```rust
/// use copythrough_core::protocol::{decode_message, encode_message};
/// use copythrough_core::protocol::messages::{ClipboardFormat, ClipboardMessage};
///
/// let msg = ClipboardMessage::new("host-a", ClipboardFormat::Text, b"hello".to_vec());
/// let bytes = encode_message(&msg).unwrap();
/// assert_eq!(decode_message(&bytes).unwrap(), msg);
/// ```
pub fn encode_message(msg: &ClipboardMessage) -> Result<Vec<u8>, ProtocolError> {
    let origin = msg.origin.as_bytes();
    let origin_len =
        u16::try_from(origin.len()).map_err(|_| ProtocolError::OriginTooLong(origin.len()))?;
    let payload_len = u32::try_from(msg.payload.len())
        .map_err(|_| ProtocolError::PayloadTooLarge(msg.payload.len()))?;

    let mut buf = Vec::with_capacity(HEADER_SIZE + origin.len() + msg.payload.len());

    // Header: magic (2) + version (1) + format (1) + origin_len (2) +
    //         payload_len (4) = 10 bytes
    buf.extend_from_slice(&MAGIC);
    buf.push(PROTOCOL_VERSION);
    buf.push(msg.format as u8);
    buf.extend_from_slice(&origin_len.to_be_bytes());
    buf.extend_from_slice(&payload_len.to_be_bytes());

    buf.extend_from_slice(origin);
    buf.extend_from_slice(&msg.payload);
    Ok(buf)
}

/// Length of origin plus payload, or `None` if it does not fit in `usize`
/// (possible on 32-bit targets with a hostile header).
fn declared_body_len(origin_len: usize, payload_len: usize) -> Option<usize> {
    origin_len.checked_add(payload_len)
}

/// Decodes the full contents of the shared file into a [`ClipboardMessage`].
///
/// # Errors
///
/// Returns [`ProtocolError`] if the bytes are truncated, carry trailing data,
/// or contain an unknown magic, version, or format.
pub fn decode_message(bytes: &[u8]) -> Result<ClipboardMessage, ProtocolError> {
    if bytes.len() < HEADER_SIZE {
        return Err(ProtocolError::InsufficientData {
            needed: HEADER_SIZE,
            available: bytes.len(),
        });
    }

    if bytes[0..2] != MAGIC {
        return Err(ProtocolError::BadMagic(bytes[0], bytes[1]));
    }

    let version = bytes[2];
    if version != PROTOCOL_VERSION {
        return Err(ProtocolError::UnsupportedVersion(version));
    }

    let format =
        ClipboardFormat::try_from(bytes[3]).map_err(|_| ProtocolError::UnknownFormat(bytes[3]))?;

    let origin_len = u16::from_be_bytes([bytes[4], bytes[5]]) as usize;
    let payload_len = u32::from_be_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]) as usize;

    let body = &bytes[HEADER_SIZE..];
    let Some(declared) = declared_body_len(origin_len, payload_len) else {
        return Err(ProtocolError::PayloadLengthMismatch {
            declared: usize::MAX,
            available: body.len(),
        });
    };
    if body.len() < declared {
        return Err(ProtocolError::PayloadLengthMismatch {
            declared,
            available: body.len(),
        });
    }
    if body.len() > declared {
        return Err(ProtocolError::TrailingBytes(body.len() - declared));
    }

    let origin = std::str::from_utf8(&body[..origin_len])
        .map_err(|e| ProtocolError::MalformedOrigin(format!("invalid UTF-8: {e}")))?
        .to_string();
    let payload = body[origin_len..].to_vec();

    Ok(ClipboardMessage {
        origin,
        format,
        payload,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
