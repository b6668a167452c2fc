//! # copythrough-core
//!
//! Shared library for copythrough containing the shared-file wire protocol,
//! the presence state machine, and the immutable sync configuration.
//!
//! This crate has zero dependencies on clipboard APIs, file watchers, or an
//! async runtime, so every rule in it can be unit-tested on any platform.
//!
//! # Architecture overview
//!
//! copythrough relays clipboard contents between hosts through a single file
//! on removable or shared storage (typically a USB stick).  Every host writes
//! its local clipboard changes into that file, tagged with its own identity,
//! and imports changes written by other hosts.
//!
//! - **`protocol`** – How a clipboard change is laid out in the shared file.
//!   A [`ClipboardMessage`] is encoded into a compact binary format (10-byte
//!   header + origin + payload) and decoded back on the other host.
//!
//! - **`domain`** – Pure logic with no OS dependencies: the
//!   [`PresenceTracker`] that turns periodic existence checks into
//!   absent/present edges, and the [`SyncConfig`] every component is built
//!   from.

pub mod domain;
pub mod protocol;

pub use domain::config::{SyncConfig, DEFAULT_POLL_INTERVAL, SENTINEL_FILE_NAME};
pub use domain::presence::{PresenceEdge, PresenceState, PresenceTracker};
pub use protocol::codec::{decode_message, encode_message, ProtocolError};
pub use protocol::messages::{ClipboardFormat, ClipboardMessage};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    const MANIFEST: &str = include_str!("../Cargo.toml");

    /// Names declared in the `[dependencies]` table of this crate.
    fn runtime_dependencies() -> Vec<&'static str> {
        MANIFEST
            .lines()
            .skip_while(|line| line.trim() != "[dependencies]")
            .skip(1)
            .take_while(|line| !line.trim_start().starts_with('['))
            .filter_map(|line| line.split('=').next())
            .map(str::trim)
            .filter(|name| !name.is_empty() && !name.starts_with('#'))
            .collect()
    }

    #[test]
    fn test_core_depends_only_on_error_derives() {
        // The wire format is hand-written; nothing here is serialized any
        // other way, and the crate does no I/O.
        assert_eq!(runtime_dependencies(), vec!["thiserror"]);
    }
}
