//! Infrastructure layer: concrete implementations of the application ports.
//!
//! - [`clipboard`] – `arboard` sink and `clipboard-rs` change watcher, plus a mock.
//! - [`shared_file`] – `tokio::fs` adapter and an in-memory double.
//! - [`watcher`] – `notify` native watch and a recording mock.
//! - [`presence_poller`] – timer that synthesizes `Appeared` events.
//! - [`relay`] – spawns the tasks and wires them together.

pub mod clipboard;
pub mod presence_poller;
pub mod relay;
pub mod shared_file;
pub mod watcher;
