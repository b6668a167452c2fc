//! Mock native watch for testing.
//!
//! [`MockWatch`] records every `arm` call and never delivers events on its
//! own; tests push events into the native channel directly.  Clones share
//! their recorded state, so a test can keep one handle while the detector
//! owns another.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::application::ports::{NativeWatch, WatchError, WatchStatus};

/// A [`NativeWatch`] that records arm calls.
#[derive(Debug, Clone, Default)]
pub struct MockWatch {
    arms: Arc<Mutex<Vec<PathBuf>>>,
    path_missing: Arc<AtomicBool>,
    /// When `true`, every `arm` fails with [`WatchError::Arm`].
    pub should_fail: bool,
}

impl MockWatch {
    /// Creates a watch that reports every path as present.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent `arm` calls report [`WatchStatus::PathMissing`].
    pub fn set_path_missing(&self, missing: bool) {
        self.path_missing.store(missing, Ordering::SeqCst);
    }

    /// Returns the paths passed to `arm`, in call order.
    pub fn arm_calls(&self) -> Vec<PathBuf> {
        self.arms.lock().unwrap().clone()
    }
}

impl NativeWatch for MockWatch {
    fn arm(&mut self, path: &Path) -> Result<WatchStatus, WatchError> {
        self.arms.lock().unwrap().push(path.to_path_buf());
        if self.should_fail {
            return Err(WatchError::Arm {
                path: path.display().to_string(),
                reason: "mock arm failure".to_string(),
            });
        }
        if self.path_missing.load(Ordering::SeqCst) {
            Ok(WatchStatus::PathMissing)
        } else {
            Ok(WatchStatus::Armed)
        }
    }
}
