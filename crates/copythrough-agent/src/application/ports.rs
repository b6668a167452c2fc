//! Ports: the traits through which the use cases reach the outside world.
//!
//! Each external collaborator (system clipboard, shared storage, native file
//! notifications) is reached through one of these traits.  Production
//! implementations live in the infrastructure layer; tests inject in-memory
//! doubles or `mockall` mocks, so every use case can be exercised without a
//! display server or a USB stick.

use std::io;
use std::path::Path;

use async_trait::async_trait;
use copythrough_core::ClipboardFormat;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::application::publish_outbound::LocalClipboardChange;

/// Error type for clipboard operations.
#[derive(Debug, Error)]
pub enum ClipboardError {
    /// The clipboard subsystem could not be opened.
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),

    /// The platform rejected a read or write.
    #[error("platform error: {0}")]
    Platform(String),

    /// The payload cannot be represented in the requested format (for
    /// example non-UTF-8 text or a corrupt PNG).
    #[error("invalid {format} payload: {reason}")]
    InvalidPayload {
        format: ClipboardFormat,
        reason: String,
    },
}

/// Writes content to the local clipboard.
///
/// Implementations may block; async callers run `write` on the blocking
/// pool.
#[cfg_attr(test, mockall::automock)]
pub trait ClipboardSink: Send + Sync {
    /// Replaces the local clipboard content with `payload` in `format`.
    fn write(&self, format: ClipboardFormat, payload: &[u8]) -> Result<(), ClipboardError>;
}

/// Produces a stream of local clipboard changes.
pub trait ClipboardSource: Send {
    /// Starts watching every format in `formats` and returns one merged
    /// receiver of changes.  The receiver closes when the source stops.
    fn start(
        &self,
        formats: &[ClipboardFormat],
    ) -> Result<mpsc::Receiver<LocalClipboardChange>, ClipboardError>;
}

/// The single file on shared storage that relays messages between hosts.
///
/// Every method treats the file as a resource this process does not own: it
/// may vanish between two calls.
#[async_trait]
pub trait SharedFile: Send + Sync {
    /// Path of the file, for log messages.
    fn path(&self) -> &Path;

    /// Returns whether the file currently exists.
    async fn exists(&self) -> io::Result<bool>;

    /// Reads the entire file.  Returns `Ok(None)` if it does not exist.
    async fn read(&self) -> io::Result<Option<Vec<u8>>>;

    /// Replaces the entire file with `bytes`.
    ///
    /// Fails with [`io::ErrorKind::NotFound`] when the containing directory
    /// is missing (storage ejected).
    async fn write(&self, bytes: &[u8]) -> io::Result<()>;
}

/// Error type for native file-notification operations.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The notification backend could not be created.
    #[error("failed to start file watcher: {0}")]
    Backend(String),

    /// A watch could not be added for a reason other than a missing path.
    #[error("failed to watch {path}: {reason}")]
    Arm { path: String, reason: String },
}

/// Result of trying to arm a native watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchStatus {
    /// Write notifications for the path are now being delivered.
    Armed,
    /// The path does not exist yet; the presence poller will cover it.
    PathMissing,
}

/// Native write notifications for a single path.
///
/// Implementations deliver their notifications on the channel supplied when
/// they were constructed; this trait only controls which path is watched.
pub trait NativeWatch: Send {
    /// (Re)starts watching `path`.  Safe to call repeatedly.
    fn arm(&mut self, path: &Path) -> Result<WatchStatus, WatchError>;
}
