//! Domain entities for copythrough.
//!
//! This module contains pure logic with no infrastructure dependencies: it
//! never touches the filesystem, the clipboard, or a runtime.  The
//! infrastructure layer feeds it observations (for example "the shared file
//! exists right now") and acts on the decisions it returns.

/// Immutable runtime configuration shared by every component.
pub mod config;

/// Absent/present edge detection for the shared file.
///
/// See [`presence::PresenceTracker`] for the main type.
pub mod presence;
