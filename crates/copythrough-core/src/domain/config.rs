//! Sync configuration.
//!
//! [`SyncConfig`] is the single source of truth for runtime settings.  It is
//! built once at startup (from CLI arguments in production, or from
//! [`SyncConfig::default`] / [`SyncConfig::new`] in tests) and then shared
//! through an `Arc`.  Both pipelines read the same origin and path from it,
//! so the identity used to tag outgoing messages is always the one used to
//! filter incoming ones.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Fixed name of the shared file inside the configured directory.
pub const SENTINEL_FILE_NAME: &str = ".COPYTHROUGH";

/// Default interval between shared-file existence checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// All runtime configuration for one relay process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Directory on the shared storage (for example the USB mount point).
    pub shared_dir: PathBuf,
    /// Identity of this host, used both to tag and to filter messages.
    pub origin: String,
    /// How often the presence poller checks whether the shared file exists.
    pub poll_interval: Duration,
}

impl SyncConfig {
    /// Creates a configuration with default intervals.
    pub fn new(shared_dir: impl Into<PathBuf>, origin: impl Into<String>) -> Self {
        Self {
            shared_dir: shared_dir.into(),
            origin: origin.into(),
            ..Self::default()
        }
    }

    /// Full path of the shared file: `<shared_dir>/.COPYTHROUGH`.
    pub fn shared_file_path(&self) -> PathBuf {
        self.shared_dir.join(SENTINEL_FILE_NAME)
    }

    /// The configured directory.
    pub fn shared_dir(&self) -> &Path {
        &self.shared_dir
    }
}

impl Default for SyncConfig {
    /// | Field         | Default     |
    /// |---------------|-------------|
    /// | shared_dir    | `.`         |
    /// | origin        | `localhost` |
    /// | poll_interval | 250 ms      |
    fn default() -> Self {
        Self {
            shared_dir: PathBuf::from("."),
            origin: "localhost".to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
