//! Relay composition: wires the ports into the four long-running tasks.
//!
//! ```text
//!   NativeWatch ──native──┐
//!                         ├─► ChangeDetector ──► ApplyInboundUseCase ──► ClipboardSink
//!   PresencePoller ─pres.─┘
//!
//!   ClipboardSource ──local──► PublishLocalUseCase ──► SharedFile
//! ```
//!
//! Each stream runs on its own tokio task for the life of the process.
//! [`run_relay`] returns as soon as any of them ends: with its error, or with
//! [`RelayError::Stopped`] if it finished cleanly (for example the clipboard
//! watcher died and closed its channel), so a host never keeps running with
//! only one direction working.

use std::sync::Arc;

use copythrough_core::SyncConfig;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::application::apply_inbound::{ApplyInboundUseCase, InboundError};
use crate::application::change_detector::{ChangeDetector, ChangeEvent};
use crate::application::ports::{ClipboardSink, NativeWatch, SharedFile, WatchError};
use crate::application::publish_outbound::{LocalClipboardChange, OutboundError, PublishLocalUseCase};
use crate::infrastructure::presence_poller::PresencePoller;

/// Depth of the internal event queues.
pub const EVENT_QUEUE_DEPTH: usize = 64;

/// Fatal errors from any relay task.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Watch(#[from] WatchError),

    #[error(transparent)]
    Inbound(#[from] InboundError),

    #[error(transparent)]
    Outbound(#[from] OutboundError),

    #[error("relay task failed: {0}")]
    TaskFailed(String),

    /// A task that should run for the life of the process returned.
    #[error("{0} stopped unexpectedly")]
    Stopped(&'static str),
}

/// Everything the relay needs from the outside world.
pub struct RelayPorts {
    pub shared_file: Arc<dyn SharedFile>,
    pub clipboard: Arc<dyn ClipboardSink>,
    /// Native watch; its events must arrive on `native_events`.
    pub watch: Box<dyn NativeWatch>,
    pub native_events: mpsc::Receiver<ChangeEvent>,
    pub local_changes: mpsc::Receiver<LocalClipboardChange>,
}

/// Runs the relay until one of its tasks ends.
///
/// # Errors
///
/// Always returns an error: the first task's [`RelayError`], or
/// [`RelayError::Stopped`] naming a task that returned early.  The remaining
/// tasks are aborted.
pub async fn run_relay(config: Arc<SyncConfig>, ports: RelayPorts) -> Result<(), RelayError> {
    let (presence_tx, presence_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
    let (change_tx, change_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);

    let detector = ChangeDetector::new(
        config.shared_file_path(),
        ports.watch,
        ports.native_events,
        presence_rx,
    );
    let poller = PresencePoller::new(Arc::clone(&ports.shared_file), config.poll_interval);
    let inbound = ApplyInboundUseCase::new(
        Arc::clone(&config),
        Arc::clone(&ports.shared_file),
        ports.clipboard,
    );
    let outbound = PublishLocalUseCase::new(Arc::clone(&config), ports.shared_file);

    let mut tasks: JoinSet<Result<&'static str, RelayError>> = JoinSet::new();
    tasks.spawn(async move {
        detector.run(change_tx).await?;
        Ok::<_, RelayError>("change detector")
    });
    tasks.spawn(async move {
        poller.run(presence_tx).await;
        Ok::<_, RelayError>("presence poller")
    });
    tasks.spawn(async move {
        inbound.run(change_rx).await?;
        Ok::<_, RelayError>("inbound pipeline")
    });
    tasks.spawn(async move {
        outbound.run(ports.local_changes).await?;
        Ok::<_, RelayError>("outbound pipeline")
    });

    info!(
        origin = %config.origin,
        path = %config.shared_file_path().display(),
        "relay running"
    );

    let error = match tasks.join_next().await {
        Some(Ok(Ok(name))) => RelayError::Stopped(name),
        Some(Ok(Err(e))) => e,
        Some(Err(e)) => RelayError::TaskFailed(e.to_string()),
        None => RelayError::TaskFailed("no relay tasks were started".to_string()),
    };
    error!("relay stopping: {error}");
    tasks.abort_all();
    Err(error)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
