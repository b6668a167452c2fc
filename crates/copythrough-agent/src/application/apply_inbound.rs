//! ApplyInboundUseCase: imports clipboard changes written by other hosts.
//!
//! On every [`ChangeEvent`] the use case re-reads the whole shared file,
//! decodes it, drops messages this host wrote itself, and applies the rest
//! to the local clipboard.
//!
//! # Loop prevention
//!
//! Our own writes to the shared file trigger the same notifications as a
//! peer's writes.  The origin tag is the only thing that tells them apart, so
//! the filter depends on nothing but `message.origin == config.origin`.  It
//! stays correct no matter how events are reordered or duplicated.

use std::path::PathBuf;
use std::sync::Arc;

use copythrough_core::{decode_message, ClipboardFormat, ClipboardMessage, ProtocolError, SyncConfig};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::application::change_detector::ChangeEvent;
use crate::application::ports::{ClipboardError, ClipboardSink, SharedFile};

/// Errors that stop the inbound pipeline.
#[derive(Debug, Error)]
pub enum InboundError {
    /// The shared file exists but could not be read.
    #[error("failed to read shared file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The local clipboard refused a well-formed payload.
    #[error("failed to apply {format} to local clipboard: {source}")]
    Clipboard {
        format: ClipboardFormat,
        #[source]
        source: ClipboardError,
    },
}

/// What happened to one change event.
#[derive(Debug)]
pub enum InboundOutcome {
    /// A foreign message was written to the local clipboard.
    Applied(ClipboardMessage),
    /// The message was written by this host and was discarded.
    Echo,
    /// The shared file vanished before it could be read.
    Absent,
    /// The file contents did not decode (possibly read mid-write).
    Malformed(ProtocolError),
    /// The payload decoded but is unusable in its format (e.g. corrupt PNG).
    Rejected(ClipboardError),
}

/// The Apply Inbound use case.
pub struct ApplyInboundUseCase {
    config: Arc<SyncConfig>,
    shared_file: Arc<dyn SharedFile>,
    clipboard: Arc<dyn ClipboardSink>,
}

impl ApplyInboundUseCase {
    /// Creates a new use case.
    pub fn new(
        config: Arc<SyncConfig>,
        shared_file: Arc<dyn SharedFile>,
        clipboard: Arc<dyn ClipboardSink>,
    ) -> Self {
        Self {
            config,
            shared_file,
            clipboard,
        }
    }

    /// Processes a single change event.
    ///
    /// # Errors
    ///
    /// Returns [`InboundError`] for read failures other than "not found" and
    /// for clipboard write failures.  Missing files, undecodable contents,
    /// and echoes are reported as [`InboundOutcome`]s instead.
    pub async fn handle_change(&self, event: ChangeEvent) -> Result<InboundOutcome, InboundError> {
        debug!(?event, "shared file changed");

        let bytes = match self.shared_file.read().await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!("{} vanished before it could be read", self.shared_file.path().display());
                return Ok(InboundOutcome::Absent);
            }
            Err(source) => {
                return Err(InboundError::Read {
                    path: self.shared_file.path().to_path_buf(),
                    source,
                })
            }
        };

        let message = match decode_message(&bytes) {
            Ok(message) => message,
            Err(e) => {
                warn!("ignoring undecodable shared file ({} bytes): {e}", bytes.len());
                return Ok(InboundOutcome::Malformed(e));
            }
        };

        if message.is_from(&self.config.origin) {
            debug!("ignoring own message: {message}");
            return Ok(InboundOutcome::Echo);
        }

        let format = message.format;

        // Platform clipboard calls block (PNG decode, X11 round trips); keep
        // them off the async workers.
        let clipboard = Arc::clone(&self.clipboard);
        let (message, written) = tokio::task::spawn_blocking(move || {
            let written = clipboard.write(message.format, &message.payload);
            (message, written)
        })
        .await
        .map_err(|e| InboundError::Clipboard {
            format,
            source: ClipboardError::Platform(format!("clipboard write task failed: {e}")),
        })?;

        match written {
            Ok(()) => {}
            Err(e @ ClipboardError::InvalidPayload { .. }) => {
                warn!("cannot apply message from {}: {e}", message.origin);
                return Ok(InboundOutcome::Rejected(e));
            }
            Err(source) => {
                return Err(InboundError::Clipboard {
                    format: message.format,
                    source,
                })
            }
        }

        info!("received {message}");
        Ok(InboundOutcome::Applied(message))
    }

    /// Handles events until the channel closes or a fatal error occurs.
    ///
    /// # Errors
    ///
    /// Returns the first [`InboundError`] encountered.
    pub async fn run(self, mut events: mpsc::Receiver<ChangeEvent>) -> Result<(), InboundError> {
        while let Some(event) = events.recv().await {
            self.handle_change(event).await?;
        }
        debug!("change event channel closed; inbound pipeline stopping");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
