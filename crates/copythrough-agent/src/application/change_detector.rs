//! ChangeDetector: merges native write notifications and synthetic presence
//! events into the single stream consumed by the inbound pipeline.
//!
//! # Why two sources?
//!
//! A native watch only reports writes to a path that already exists.  When
//! the shared file appears because storage was mounted, no notification
//! fires, so the presence poller synthesizes a [`ChangeEvent::Appeared`]
//! instead.  The two sources stay separate until they reach this merge, so
//! each can be tested on its own.
//!
//! Ordering between the sources is not preserved and the same write may be
//! reported by both.  The inbound pipeline re-reads the whole file on every
//! event, so duplicates are harmless.
//!
//! # Re-arming
//!
//! Every `Appeared` event re-arms the native watch.  This picks up a file
//! that did not exist at startup, and a volume that was ejected and
//! re-inserted (which silently drops the old watch).

use std::path::PathBuf;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::application::ports::{NativeWatch, WatchError, WatchStatus};

/// A logical "shared file changed" event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeEvent {
    /// A native notification reported a write to the shared file.
    Written,
    /// The presence poller saw the shared file appear.
    Appeared,
}

/// Merges the native and presence event streams.
pub struct ChangeDetector {
    path: PathBuf,
    watch: Box<dyn NativeWatch>,
    native_events: mpsc::Receiver<ChangeEvent>,
    presence_events: mpsc::Receiver<ChangeEvent>,
}

impl ChangeDetector {
    /// Creates a detector for `path`.
    ///
    /// `native_events` is the channel the `watch` implementation delivers to;
    /// `presence_events` is fed by the presence poller.
    pub fn new(
        path: PathBuf,
        watch: Box<dyn NativeWatch>,
        native_events: mpsc::Receiver<ChangeEvent>,
        presence_events: mpsc::Receiver<ChangeEvent>,
    ) -> Self {
        Self {
            path,
            watch,
            native_events,
            presence_events,
        }
    }

    /// Arms the native watch on the shared file.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError`] if the watch fails for any reason other than
    /// the file not existing yet.
    pub fn arm(&mut self) -> Result<WatchStatus, WatchError> {
        let status = self.watch.arm(&self.path)?;
        match status {
            WatchStatus::Armed => debug!("watching {} for writes", self.path.display()),
            WatchStatus::PathMissing => {
                info!("{} does not exist yet; waiting for it to appear", self.path.display())
            }
        }
        Ok(status)
    }

    /// Forwards events from both sources to `out` until both sources close
    /// or `out` is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError`] if (re)arming the native watch fails.
    pub async fn run(mut self, out: mpsc::Sender<ChangeEvent>) -> Result<(), WatchError> {
        self.arm()?;

        let mut native_open = true;
        let mut presence_open = true;

        loop {
            let event = tokio::select! {
                event = self.native_events.recv(), if native_open => match event {
                    Some(event) => event,
                    None => {
                        debug!("native watch channel closed");
                        native_open = false;
                        continue;
                    }
                },
                event = self.presence_events.recv(), if presence_open => match event {
                    Some(event) => {
                        self.arm()?;
                        event
                    }
                    None => {
                        debug!("presence channel closed");
                        presence_open = false;
                        continue;
                    }
                },
                else => break,
            };

            if out.send(event).await.is_err() {
                debug!("change consumer dropped; stopping change detector");
                break;
            }
        }

        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
