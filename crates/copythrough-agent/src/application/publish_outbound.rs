//! PublishLocalUseCase: exports local clipboard changes to the shared file.
//!
//! Each change is wrapped in a [`ClipboardMessage`] tagged with this host's
//! origin, encoded, and written over the whole shared file.  There is no
//! debouncing: a repeated identical write is harmless because peers applying
//! the same payload twice leave their clipboard unchanged.
//!
//! Writes triggered by the inbound pipeline (we apply a peer's text, the
//! clipboard source notices, we re-export it under our own origin) are
//! accepted.  The payload is unchanged, so the hosts settle instead of
//! looping.

use std::path::PathBuf;
use std::sync::Arc;

use copythrough_core::{encode_message, ClipboardFormat, ClipboardMessage, ProtocolError, SyncConfig};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::application::ports::SharedFile;

/// A change observed on the local clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalClipboardChange {
    pub format: ClipboardFormat,
    pub payload: Vec<u8>,
}

/// Errors that stop the outbound pipeline.
#[derive(Debug, Error)]
pub enum OutboundError {
    /// The message could not be encoded.
    #[error("failed to encode clipboard message: {0}")]
    Encode(#[from] ProtocolError),

    /// The shared storage is present but rejected the write.
    #[error("failed to write shared file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What happened to one local change.
#[derive(Debug, PartialEq)]
pub enum OutboundOutcome {
    /// The message now sits in the shared file.
    Published(ClipboardMessage),
    /// The shared storage was not mounted; the change was dropped.
    Skipped,
}

/// The Publish Local use case.
pub struct PublishLocalUseCase {
    config: Arc<SyncConfig>,
    shared_file: Arc<dyn SharedFile>,
}

impl PublishLocalUseCase {
    /// Creates a new use case.
    pub fn new(config: Arc<SyncConfig>, shared_file: Arc<dyn SharedFile>) -> Self {
        Self {
            config,
            shared_file,
        }
    }

    /// Writes one local change to the shared file.
    ///
    /// Delivery is best-effort: if the storage is absent the change is
    /// dropped and [`OutboundOutcome::Skipped`] is returned.
    ///
    /// # Errors
    ///
    /// Returns [`OutboundError`] if encoding fails or if the write fails for
    /// any reason other than the directory being missing.
    pub async fn publish(
        &self,
        change: LocalClipboardChange,
    ) -> Result<OutboundOutcome, OutboundError> {
        let message = ClipboardMessage::new(self.config.origin.clone(), change.format, change.payload);
        let bytes = encode_message(&message)?;

        match self.shared_file.write(&bytes).await {
            Ok(()) => {
                info!("sent {message}");
                Ok(OutboundOutcome::Published(message))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "shared storage not available ({}); dropped local {} change",
                    self.shared_file.path().display(),
                    message.format
                );
                Ok(OutboundOutcome::Skipped)
            }
            Err(source) => Err(OutboundError::Write {
                path: self.shared_file.path().to_path_buf(),
                source,
            }),
        }
    }

    /// Publishes changes until the channel closes or a fatal error occurs.
    ///
    /// # Errors
    ///
    /// Returns the first [`OutboundError`] encountered.
    pub async fn run(
        self,
        mut changes: mpsc::Receiver<LocalClipboardChange>,
    ) -> Result<(), OutboundError> {
        while let Some(change) = changes.recv().await {
            self.publish(change).await?;
        }
        debug!("local clipboard channel closed; outbound pipeline stopping");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
