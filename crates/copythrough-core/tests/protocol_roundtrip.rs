//! Integration tests for the copythrough-core protocol codec.
//!
//! These tests go through the crate-root re-exports, the way the agent uses
//! the codec, and cover the properties the relay depends on: exact round
//! trips, whole-file framing, and rejection of partially written files.

use copythrough_core::{
    decode_message, encode_message, ClipboardFormat, ClipboardMessage, ProtocolError,
};

#[test]
fn test_roundtrip_text_message() {
    let original = ClipboardMessage::new("A", ClipboardFormat::Text, b"hello".to_vec());

    let bytes = encode_message(&original).expect("encode must succeed");
    let decoded = decode_message(&bytes).expect("decode must succeed");

    assert_eq!(original, decoded);
}

#[test]
fn test_roundtrip_large_image_message() {
    // 1 MiB is well within a typical screenshot PNG size.
    let payload: Vec<u8> = (0..1024 * 1024).map(|i| (i % 251) as u8).collect();
    let original = ClipboardMessage::new("studio-mac", ClipboardFormat::Image, payload);

    let bytes = encode_message(&original).expect("encode must succeed");

    assert_eq!(original, decode_message(&bytes).expect("decode must succeed"));
}

#[test]
fn test_every_strict_prefix_of_an_encoded_message_is_rejected() {
    // A reader racing a peer's write may observe any prefix of the file.
    let original = ClipboardMessage::new("peer", ClipboardFormat::Text, b"partial write".to_vec());
    let bytes = encode_message(&original).unwrap();

    for cut in 0..bytes.len() {
        let result = decode_message(&bytes[..cut]);
        assert!(
            matches!(
                result,
                Err(ProtocolError::InsufficientData { .. })
                    | Err(ProtocolError::PayloadLengthMismatch { .. })
            ),
            "prefix of length {cut} must not decode, got {result:?}"
        );
    }
}

#[test]
fn test_overwriting_shorter_message_over_longer_one_is_detected() {
    // Without truncation, a short write over a long file leaves stale bytes.
    let long = encode_message(&ClipboardMessage::new(
        "A",
        ClipboardFormat::Text,
        b"a much longer clipboard value".to_vec(),
    ))
    .unwrap();
    let short = encode_message(&ClipboardMessage::new("B", ClipboardFormat::Text, b"hi".to_vec()))
        .unwrap();

    let mut file = long.clone();
    file[..short.len()].copy_from_slice(&short);

    assert!(matches!(decode_message(&file), Err(ProtocolError::TrailingBytes(_))));
}
