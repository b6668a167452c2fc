//! Application layer use cases for the relay.
//!
//! # What use cases does the relay have?
//!
//! - **`change_detector`** – Merges native write notifications and the
//!   presence poller's synthetic events into one stream of
//!   [`change_detector::ChangeEvent`]s, re-arming the native watch whenever
//!   the shared file appears.
//!
//! - **`apply_inbound`** – Reads the shared file on every change event,
//!   decodes it, drops this host's own messages (loop prevention), and writes
//!   foreign payloads to the local clipboard.
//!
//! - **`publish_outbound`** – Tags each local clipboard change with this
//!   host's origin and overwrites the shared file with it.
//!
//! All three depend only on the traits in [`ports`]; the infrastructure layer
//! supplies the implementations.

pub mod apply_inbound;
pub mod change_detector;
pub mod ports;
pub mod publish_outbound;
