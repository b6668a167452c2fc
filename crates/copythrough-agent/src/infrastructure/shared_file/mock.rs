//! In-memory shared file for testing.
//!
//! [`MemorySharedFile`] keeps the file contents in memory and lets a test
//! play the part of a peer host or of the USB stick itself:
//!
//! - `set_contents(Some(bytes))` – a peer wrote the file (or the stick was
//!   plugged in with the file on it).
//! - `set_contents(None)` – the file vanished.
//! - `set_storage_present(false)` – the whole directory is gone, so writes
//!   fail with `NotFound` just like a real ejected volume.
//! - `fail_reads` / `fail_writes` – inject I/O errors other than `NotFound`.
//!
//! Several use cases can share one instance through an `Arc`, which is how
//! the integration tests model two hosts plugged into the same stick.

use std::io;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::ports::SharedFile;

#[derive(Debug)]
struct State {
    contents: Option<Vec<u8>>,
    storage_present: bool,
    read_error: Option<io::ErrorKind>,
    write_error: Option<io::ErrorKind>,
    write_count: usize,
}

/// A [`SharedFile`] backed by memory.
#[derive(Debug)]
pub struct MemorySharedFile {
    state: Mutex<State>,
}

impl MemorySharedFile {
    /// Creates a mounted but empty store: the file does not exist yet.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                contents: None,
                storage_present: true,
                read_error: None,
                write_error: None,
                write_count: 0,
            }),
        }
    }

    /// Creates a store whose file already holds `bytes`.
    pub fn with_contents(bytes: Vec<u8>) -> Self {
        let file = Self::new();
        file.set_contents(Some(bytes));
        file
    }

    /// Replaces (or removes) the file contents as if another host did it.
    pub fn set_contents(&self, contents: Option<Vec<u8>>) {
        self.state.lock().unwrap().contents = contents;
    }

    /// Returns the current file contents.
    pub fn contents(&self) -> Option<Vec<u8>> {
        self.state.lock().unwrap().contents.clone()
    }

    /// Mounts or ejects the storage.  Ejecting also removes the file.
    pub fn set_storage_present(&self, present: bool) {
        let mut state = self.state.lock().unwrap();
        state.storage_present = present;
        if !present {
            state.contents = None;
        }
    }

    /// Makes every subsequent read fail with `kind`.
    pub fn fail_reads(&self, kind: io::ErrorKind) {
        self.state.lock().unwrap().read_error = Some(kind);
    }

    /// Makes every subsequent write fail with `kind`.
    pub fn fail_writes(&self, kind: io::ErrorKind) {
        self.state.lock().unwrap().write_error = Some(kind);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.state.lock().unwrap().write_count
    }
}

impl Default for MemorySharedFile {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SharedFile for MemorySharedFile {
    fn path(&self) -> &Path {
        Path::new("<memory>/.COPYTHROUGH")
    }

    async fn exists(&self) -> io::Result<bool> {
        Ok(self.state.lock().unwrap().contents.is_some())
    }

    async fn read(&self) -> io::Result<Option<Vec<u8>>> {
        let state = self.state.lock().unwrap();
        if let Some(kind) = state.read_error {
            return Err(io::Error::new(kind, "injected read failure"));
        }
        Ok(state.contents.clone())
    }

    async fn write(&self, bytes: &[u8]) -> io::Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(kind) = state.write_error {
            return Err(io::Error::new(kind, "injected write failure"));
        }
        if !state.storage_present {
            return Err(io::Error::new(io::ErrorKind::NotFound, "storage not mounted"));
        }
        state.contents = Some(bytes.to_vec());
        state.write_count += 1;
        Ok(())
    }
}
