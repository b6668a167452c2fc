//! copythrough-agent library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does the agent do?
//!
//! One agent runs on every host that takes part in the sync.  All of them
//! point at the same directory on shared storage (typically a USB stick that
//! is moved between machines, or a network share).
//!
//! 1. A local clipboard change is tagged with this host's origin and written
//!    to `<dir>/.COPYTHROUGH`.
//! 2. A change to that file (a native write notification, or the file
//!    appearing because the stick was plugged in) is read back and decoded.
//! 3. Messages carrying this host's origin are discarded; every other message
//!    is written to the local clipboard.

/// Application layer: ports and use cases.
pub mod application;

/// Infrastructure layer: clipboard, filesystem, and notification adapters.
pub mod infrastructure;
