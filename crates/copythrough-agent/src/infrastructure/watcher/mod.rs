//! Native file notifications via the `notify` crate.
//!
//! [`NotifyWatch`] wraps the platform's recommended watcher (inotify,
//! FSEvents, ReadDirectoryChangesW) and turns write events on the shared
//! file into [`ChangeEvent::Written`].  Delivery uses `try_send`: if the
//! queue is full, a re-read is already pending and will pick up the latest
//! contents anyway.

use std::path::{Path, PathBuf};

use notify::event::{AccessKind, AccessMode, ModifyKind};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::application::change_detector::ChangeEvent;
use crate::application::ports::{NativeWatch, WatchError, WatchStatus};

pub mod mock;

/// Returns `true` for notifications that mean the file's contents changed.
pub fn is_write_event(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Any)
            | EventKind::Access(AccessKind::Close(AccessMode::Write))
    )
}

/// A [`NativeWatch`] backed by `notify::RecommendedWatcher`.
pub struct NotifyWatch {
    watcher: RecommendedWatcher,
    current: Option<PathBuf>,
}

impl NotifyWatch {
    /// Creates the platform watcher.  Events are delivered on `tx`.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::Backend`] if the platform refuses to create a
    /// watcher (for example when the inotify instance limit is reached).
    pub fn new(tx: mpsc::Sender<ChangeEvent>) -> Result<Self, WatchError> {
        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) if is_write_event(&event.kind) => {
                // Full queue: a pending re-read already covers this write.
                let _ = tx.try_send(ChangeEvent::Written);
            }
            Ok(event) => debug!(kind = ?event.kind, "ignoring file event"),
            Err(e) => warn!("file watcher error: {e}"),
        })
        .map_err(|e| WatchError::Backend(e.to_string()))?;

        Ok(Self {
            watcher,
            current: None,
        })
    }
}

fn is_missing_path(err: &notify::Error) -> bool {
    match &err.kind {
        notify::ErrorKind::PathNotFound => true,
        notify::ErrorKind::Io(io) => io.kind() == std::io::ErrorKind::NotFound,
        _ => false,
    }
}

impl NativeWatch for NotifyWatch {
    fn arm(&mut self, path: &Path) -> Result<WatchStatus, WatchError> {
        if let Some(previous) = self.current.take() {
            // A watch on an ejected volume is already gone; that is fine.
            if let Err(e) = self.watcher.unwatch(&previous) {
                debug!("unwatch {} failed: {e}", previous.display());
            }
        }

        match self.watcher.watch(path, RecursiveMode::NonRecursive) {
            Ok(()) => {
                self.current = Some(path.to_path_buf());
                Ok(WatchStatus::Armed)
            }
            Err(e) if is_missing_path(&e) => Ok(WatchStatus::PathMissing),
            Err(e) => Err(WatchError::Arm {
                path: path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
