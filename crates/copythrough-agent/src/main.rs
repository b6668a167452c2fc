//! copythrough: clipboard relay agent entry point.
//!
//! Syncs the clipboard between hosts that share a directory, typically a USB
//! stick moved between machines.  Every host runs one agent pointed at the
//! same directory; messages travel through `<DIR>/.COPYTHROUGH`.
//!
//! # Usage
//!
//! ```text
//! copythrough <DIR> [OPTIONS]
//!
//! Options:
//!   --poll-interval <MS>  Presence poll interval [default: 250]
//!   --origin <NAME>       Origin tag for outgoing messages [default: hostname]
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable                     | Description                 |
//! |------------------------------|-----------------------------|
//! | `COPYTHROUGH_DIR`            | Shared directory            |
//! | `COPYTHROUGH_POLL_INTERVAL`  | Presence poll interval (ms) |
//! | `COPYTHROUGH_ORIGIN`         | Origin tag                  |
//! | `RUST_LOG`                   | Log filter [default: info]  |

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use copythrough_agent::application::ports::ClipboardSource;
use copythrough_agent::infrastructure::clipboard::{ArboardClipboard, WatchedClipboardSource};
use copythrough_agent::infrastructure::relay::{run_relay, RelayPorts, EVENT_QUEUE_DEPTH};
use copythrough_agent::infrastructure::shared_file::{probe_shared_dir, FsSharedFile, SharedDirStatus};
use copythrough_agent::infrastructure::watcher::NotifyWatch;
use copythrough_core::{ClipboardFormat, SyncConfig};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Clipboard relay through a file on shared storage.
#[derive(Debug, Parser)]
#[command(name = "copythrough", version)]
struct Cli {
    /// Directory on the shared storage (for example the USB stick's mount point).
    ///
    /// It may not exist yet; the agent waits for it to appear.
    #[arg(env = "COPYTHROUGH_DIR")]
    dir: PathBuf,

    /// How often to check whether the shared file exists, in milliseconds.
    #[arg(
        long,
        default_value_t = 250,
        value_parser = clap::value_parser!(u64).range(1..),
        env = "COPYTHROUGH_POLL_INTERVAL"
    )]
    poll_interval: u64,

    /// Origin tag written into outgoing messages.  Defaults to the hostname.
    ///
    /// Lets two agents run side by side on one machine.
    #[arg(long, env = "COPYTHROUGH_ORIGIN")]
    origin: Option<String>,
}

impl Cli {
    /// Converts the parsed arguments into a [`SyncConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if no `--origin` was given and the hostname is not
    /// valid UTF-8.
    fn into_sync_config(self) -> anyhow::Result<SyncConfig> {
        let origin = match self.origin {
            Some(origin) => origin,
            None => gethostname::gethostname()
                .into_string()
                .map_err(|raw| anyhow!("hostname {raw:?} is not valid UTF-8; pass --origin"))?,
        };

        let mut config = SyncConfig::new(self.dir, origin);
        config.poll_interval = Duration::from_millis(self.poll_interval);
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Arc::new(Cli::parse().into_sync_config()?);

    match probe_shared_dir(config.shared_dir()).context("unusable shared directory")? {
        SharedDirStatus::Ready => {}
        SharedDirStatus::Missing => warn!(
            "{} does not exist; waiting for the storage to be mounted",
            config.shared_dir().display()
        ),
    }

    let clipboard = ArboardClipboard::new().context("failed to open the system clipboard")?;
    let local_changes = WatchedClipboardSource::new()
        .start(&ClipboardFormat::ALL)
        .context("failed to start the clipboard watcher")?;

    let (native_tx, native_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
    let watch = NotifyWatch::new(native_tx).context("failed to start the file watcher")?;

    let ports = RelayPorts {
        shared_file: Arc::new(FsSharedFile::new(config.shared_file_path())),
        clipboard: Arc::new(clipboard),
        watch: Box::new(watch),
        native_events: native_rx,
        local_changes,
    };

    info!(
        "copythrough starting: origin={}, file={}",
        config.origin,
        config.shared_file_path().display()
    );

    tokio::select! {
        result = run_relay(Arc::clone(&config), ports) => {
            result.context("relay stopped")?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl+C")?;
            info!("received Ctrl+C; shutting down");
        }
    }

    info!("copythrough stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
