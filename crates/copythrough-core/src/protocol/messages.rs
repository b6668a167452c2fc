//! Message types exchanged through the shared file.
//!
//! The shared file always holds exactly zero or one [`ClipboardMessage`]: the
//! most recent clipboard change written by any host.

use std::fmt;

/// First two bytes of every encoded message (`"CT"`).
pub const MAGIC: [u8; 2] = *b"CT";

/// Current wire protocol version.
pub const PROTOCOL_VERSION: u8 = 0x01;

/// Size of the fixed header that precedes the origin and payload bytes.
///
/// `magic (2) + version (1) + format (1) + origin_len (2) + payload_len (4)`.
pub const HEADER_SIZE: usize = 10;

/// Maximum number of characters of a text payload shown by [`fmt::Display`].
const TEXT_PREVIEW_CHARS: usize = 64;

/// Clipboard content format carried by a message.
///
/// Text payloads are UTF-8.  Image payloads are PNG-encoded so that a peer can
/// decode them without any out-of-band information about dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ClipboardFormat {
    Text = 0x01,
    Image = 0x02,
}

impl ClipboardFormat {
    /// Every format the relay subscribes to, in subscription order.
    pub const ALL: [ClipboardFormat; 2] = [ClipboardFormat::Text, ClipboardFormat::Image];
}

impl TryFrom<u8> for ClipboardFormat {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(ClipboardFormat::Text),
            0x02 => Ok(ClipboardFormat::Image),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ClipboardFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardFormat::Text => f.write_str("text"),
            ClipboardFormat::Image => f.write_str("image"),
        }
    }
}

/// One clipboard change, as written to (or read from) the shared file.
///
/// A message is never mutated after construction; each decode yields a fresh
/// value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardMessage {
    /// Identity of the host that produced the change (normally its hostname).
    pub origin: String,
    /// Format of `payload`.
    pub format: ClipboardFormat,
    /// Raw clipboard bytes; opaque to the protocol.
    pub payload: Vec<u8>,
}

impl ClipboardMessage {
    /// Creates a message from its three parts.
    pub fn new(origin: impl Into<String>, format: ClipboardFormat, payload: Vec<u8>) -> Self {
        Self {
            origin: origin.into(),
            format,
            payload,
        }
    }

    /// Returns `true` if this message was produced by `local_origin`.
    ///
    /// This is the loop-prevention check: a host must never re-apply a change
    /// it wrote itself.
    pub fn is_from(&self, local_origin: &str) -> bool {
        self.origin == local_origin
    }
}

impl fmt::Display for ClipboardMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.format {
            ClipboardFormat::Text => {
                let text = String::from_utf8_lossy(&self.payload);
                let mut chars = text.chars();
                let preview: String = chars.by_ref().take(TEXT_PREVIEW_CHARS).collect();
                if chars.next().is_some() {
                    write!(f, "{}: {}…", self.origin, preview)
                } else {
                    write!(f, "{}: {}", self.origin, preview)
                }
            }
            ClipboardFormat::Image => {
                write!(f, "{}: image ({} bytes)", self.origin, self.payload.len())
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clipboard_format_try_from_known_values() {
        assert_eq!(ClipboardFormat::try_from(0x01), Ok(ClipboardFormat::Text));
        assert_eq!(ClipboardFormat::try_from(0x02), Ok(ClipboardFormat::Image));
    }

    #[test]
    fn test_clipboard_format_try_from_unknown_value_fails() {
        assert!(ClipboardFormat::try_from(0x00).is_err());
        assert!(ClipboardFormat::try_from(0x03).is_err());
    }

    #[test]
    fn test_is_from_matches_exact_origin_only() {
        let msg = ClipboardMessage::new("laptop", ClipboardFormat::Text, b"x".to_vec());
        assert!(msg.is_from("laptop"));
        assert!(!msg.is_from("Laptop"));
        assert!(!msg.is_from("laptop.local"));
    }

    #[test]
    fn test_display_text_message_shows_origin_and_text() {
        let msg = ClipboardMessage::new("A", ClipboardFormat::Text, b"hello".to_vec());
        assert_eq!(msg.to_string(), "A: hello");
    }

    #[test]
    fn test_display_long_text_is_truncated() {
        let text = "x".repeat(200);
        let msg = ClipboardMessage::new("A", ClipboardFormat::Text, text.into_bytes());
        let shown = msg.to_string();
        // "A: " + 64 chars + ellipsis
        assert_eq!(shown.chars().count(), 3 + TEXT_PREVIEW_CHARS + 1);
        assert!(shown.ends_with('…'));
    }

    #[test]
    fn test_display_image_message_shows_size_not_bytes() {
        let msg = ClipboardMessage::new("B", ClipboardFormat::Image, vec![0u8; 1234]);
        assert_eq!(msg.to_string(), "B: image (1234 bytes)");
    }
}
