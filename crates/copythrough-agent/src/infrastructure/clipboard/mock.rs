//! Mock clipboard for testing.
//!
//! [`MockClipboard`] records every write instead of touching the system
//! clipboard, and doubles as a [`ClipboardSource`] whose changes are pushed
//! by the test with [`MockClipboard::emit_change`].
//!
//! [`MockClipboard::with_echo`] builds one that also behaves like a real
//! clipboard watcher: a write that changes the content is reported back on
//! the change stream, and a write of identical content is not.

use std::sync::Mutex;

use copythrough_core::ClipboardFormat;
use tokio::sync::mpsc;

use crate::application::ports::{ClipboardError, ClipboardSink, ClipboardSource};
use crate::application::publish_outbound::LocalClipboardChange;

/// An in-memory clipboard that records writes.
#[derive(Debug, Default)]
pub struct MockClipboard {
    writes: Mutex<Vec<(ClipboardFormat, Vec<u8>)>>,
    source: Mutex<Option<mpsc::Sender<LocalClipboardChange>>>,
    current: Mutex<Option<(ClipboardFormat, Vec<u8>)>>,
    echo: bool,
    /// When `true`, every write fails with [`ClipboardError::Platform`].
    pub should_fail: bool,
}

impl MockClipboard {
    /// Creates a clipboard with no recorded writes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clipboard whose content-changing writes are reported on
    /// its own change stream.
    pub fn with_echo() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }

    /// Current clipboard content, if anything was copied or written.
    pub fn current(&self) -> Option<(ClipboardFormat, Vec<u8>)> {
        self.current.lock().unwrap().clone()
    }

    /// Returns all writes in call order.
    pub fn writes(&self) -> Vec<(ClipboardFormat, Vec<u8>)> {
        self.writes.lock().unwrap().clone()
    }

    /// Number of writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    /// Simulates the user copying something on this host.
    ///
    /// Returns `false` if the source was never started or its receiver has
    /// been dropped.
    pub async fn emit_change(&self, format: ClipboardFormat, payload: Vec<u8>) -> bool {
        *self.current.lock().unwrap() = Some((format, payload.clone()));
        let tx = self.source.lock().unwrap().clone();
        match tx {
            Some(tx) => tx.send(LocalClipboardChange { format, payload }).await.is_ok(),
            None => false,
        }
    }

    /// Closes the change stream, as if the clipboard watcher stopped.
    pub fn close_source(&self) {
        self.source.lock().unwrap().take();
    }
}

impl ClipboardSink for MockClipboard {
    fn write(&self, format: ClipboardFormat, payload: &[u8]) -> Result<(), ClipboardError> {
        if self.should_fail {
            return Err(ClipboardError::Platform("mock write failure".to_string()));
        }
        self.writes.lock().unwrap().push((format, payload.to_vec()));

        let entry = (format, payload.to_vec());
        let changed = {
            let mut current = self.current.lock().unwrap();
            let changed = current.as_ref() != Some(&entry);
            *current = Some(entry);
            changed
        };
        if self.echo && changed {
            if let Some(tx) = self.source.lock().unwrap().as_ref() {
                let _ = tx.try_send(LocalClipboardChange {
                    format,
                    payload: payload.to_vec(),
                });
            }
        }
        Ok(())
    }
}

impl ClipboardSource for MockClipboard {
    fn start(
        &self,
        _formats: &[ClipboardFormat],
    ) -> Result<mpsc::Receiver<LocalClipboardChange>, ClipboardError> {
        let (tx, rx) = mpsc::channel(16);
        *self.source.lock().unwrap() = Some(tx);
        Ok(rx)
    }
}
