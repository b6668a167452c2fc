//! System clipboard adapters.
//!
//! Both adapters keep their platform handle on a thread they own:
//!
//! - [`ArboardClipboard`] (the sink) runs a writer thread that serves write
//!   requests.  Keeping one `arboard::Clipboard` alive for the whole run
//!   matters on X11, where the content we set is served by our own process.
//! - [`WatchedClipboardSource`] runs a `clipboard-rs` watcher on a dedicated
//!   thread; its handler reads the changed content and forwards it into
//!   tokio with `try_send`.

use std::sync::mpsc as std_mpsc;
use std::thread;

use clipboard_rs::common::RustImage;
use clipboard_rs::{
    Clipboard, ClipboardContext, ClipboardHandler, ClipboardWatcher, ClipboardWatcherContext,
    ContentFormat,
};
use copythrough_core::ClipboardFormat;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};

use crate::application::ports::{ClipboardError, ClipboardSink, ClipboardSource};
use crate::application::publish_outbound::LocalClipboardChange;

pub mod mock;
pub mod png;

use png::{decode_png, encode_png, RgbaFrame};

/// Capacity of the channel between the watcher thread and tokio.
const CHANGE_QUEUE_DEPTH: usize = 16;

/// Clipboard content ready to hand to the platform.
enum Content {
    Text(String),
    Image(RgbaFrame),
}

impl Content {
    fn from_payload(format: ClipboardFormat, payload: &[u8]) -> Result<Self, ClipboardError> {
        match format {
            ClipboardFormat::Text => std::str::from_utf8(payload)
                .map(|s| Content::Text(s.to_owned()))
                .map_err(|e| ClipboardError::InvalidPayload {
                    format,
                    reason: e.to_string(),
                }),
            ClipboardFormat::Image => decode_png(payload).map(Content::Image),
        }
    }
}

struct WriteRequest {
    content: Content,
    reply: std_mpsc::SyncSender<Result<(), ClipboardError>>,
}

fn unavailable(e: impl std::fmt::Display) -> ClipboardError {
    ClipboardError::Unavailable(e.to_string())
}

fn open_clipboard() -> Result<arboard::Clipboard, ClipboardError> {
    arboard::Clipboard::new().map_err(unavailable)
}

fn set_content(clipboard: &mut arboard::Clipboard, content: Content) -> Result<(), ClipboardError> {
    let result = match content {
        Content::Text(text) => clipboard.set_text(text),
        Content::Image(frame) => clipboard.set_image(arboard::ImageData {
            width: frame.width as usize,
            height: frame.height as usize,
            bytes: frame.rgba.into(),
        }),
    };
    result.map_err(|e| ClipboardError::Platform(e.to_string()))
}

// ── Sink ──────────────────────────────────────────────────────────────────────

/// Writes to the system clipboard through a dedicated writer thread.
pub struct ArboardClipboard {
    requests: std_mpsc::Sender<WriteRequest>,
}

impl ArboardClipboard {
    /// Opens the system clipboard.
    ///
    /// # Errors
    ///
    /// Returns [`ClipboardError::Unavailable`] if no clipboard can be opened
    /// (for example when there is no display server).
    pub fn new() -> Result<Self, ClipboardError> {
        let (requests, inbox) = std_mpsc::channel::<WriteRequest>();
        let (ready_tx, ready_rx) = std_mpsc::sync_channel(1);

        thread::Builder::new()
            .name("copythrough-clipboard-writer".to_string())
            .spawn(move || {
                let mut clipboard = match open_clipboard() {
                    Ok(clipboard) => {
                        let _ = ready_tx.send(Ok(()));
                        clipboard
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                for request in inbox {
                    let _ = request.reply.send(set_content(&mut clipboard, request.content));
                }
                debug!("clipboard writer thread exiting");
            })
            .map_err(|e| ClipboardError::Unavailable(e.to_string()))?;

        ready_rx
            .recv()
            .map_err(|_| ClipboardError::Unavailable("clipboard writer thread died".to_string()))??;
        Ok(Self { requests })
    }
}

impl ClipboardSink for ArboardClipboard {
    fn write(&self, format: ClipboardFormat, payload: &[u8]) -> Result<(), ClipboardError> {
        let content = Content::from_payload(format, payload)?;
        let (reply, response) = std_mpsc::sync_channel(1);
        let gone = || ClipboardError::Platform("clipboard writer thread stopped".to_string());

        self.requests
            .send(WriteRequest { content, reply })
            .map_err(|_| gone())?;
        response.recv().map_err(|_| gone())?
    }
}

// ── Source ────────────────────────────────────────────────────────────────────

/// Tracks the last forwarded value of one clipboard format.
///
/// An empty sample (format not on the clipboard, or a read error) is
/// ignored, so switching from text to an image and back to the same text
/// does not re-send it.
#[derive(Debug)]
pub struct ChangeFilter<T> {
    last: Option<T>,
}

impl<T: PartialEq> ChangeFilter<T> {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Feeds one sample and returns `true` if it should be reported.
    pub fn offer(&mut self, sample: Option<T>) -> bool {
        match sample {
            Some(value) if self.last.as_ref() != Some(&value) => {
                self.last = Some(value);
                true
            }
            _ => false,
        }
    }

    /// The last value reported.
    pub fn last(&self) -> Option<&T> {
        self.last.as_ref()
    }
}

impl<T: PartialEq> Default for ChangeFilter<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Turns clipboard notifications into [`LocalClipboardChange`]s for the
/// watched formats.
///
/// Platforms notify on every clipboard write, including writes that leave
/// the content unchanged; only content that differs from the last one sent
/// is reported.
#[derive(Debug)]
pub struct ChangeCollector {
    watch_text: bool,
    watch_image: bool,
    texts: ChangeFilter<String>,
    images: ChangeFilter<RgbaFrame>,
}

impl ChangeCollector {
    pub fn new(formats: &[ClipboardFormat]) -> Self {
        Self {
            watch_text: formats.contains(&ClipboardFormat::Text),
            watch_image: formats.contains(&ClipboardFormat::Image),
            texts: ChangeFilter::new(),
            images: ChangeFilter::new(),
        }
    }

    pub fn watches(&self, format: ClipboardFormat) -> bool {
        match format {
            ClipboardFormat::Text => self.watch_text,
            ClipboardFormat::Image => self.watch_image,
        }
    }

    /// Returns the changes contained in one notification.
    pub fn collect(
        &mut self,
        text: Option<String>,
        image: Option<RgbaFrame>,
    ) -> Vec<LocalClipboardChange> {
        let mut changes = Vec::new();

        if self.watch_text && self.texts.offer(text) {
            if let Some(value) = self.texts.last() {
                changes.push(LocalClipboardChange {
                    format: ClipboardFormat::Text,
                    payload: value.as_bytes().to_vec(),
                });
            }
        }

        if self.watch_image && self.images.offer(image) {
            if let Some(frame) = self.images.last() {
                // Re-encoded so every host sends the same encoder's output.
                match encode_png(frame.clone()) {
                    Ok(payload) => changes.push(LocalClipboardChange {
                        format: ClipboardFormat::Image,
                        payload,
                    }),
                    Err(e) => warn!("dropping clipboard image: {e}"),
                }
            }
        }

        changes
    }
}

/// Hands changes to the relay without blocking the watcher thread.
///
/// A full queue drops the change with a warning.  Returns `false` once the
/// receiver has been dropped.
pub fn forward_changes(
    tx: &mpsc::Sender<LocalClipboardChange>,
    changes: Vec<LocalClipboardChange>,
) -> bool {
    for change in changes {
        debug!(format = %change.format, bytes = change.payload.len(), "local clipboard changed");
        match tx.try_send(change) {
            Ok(()) => {}
            Err(TrySendError::Full(change)) => {
                warn!(format = %change.format, "clipboard change queue full; dropping change")
            }
            Err(TrySendError::Closed(_)) => return false,
        }
    }
    true
}

fn read_text(ctx: &ClipboardContext) -> Option<String> {
    if !ctx.has(ContentFormat::Text) {
        return None;
    }
    match ctx.get_text() {
        Ok(text) => Some(text),
        Err(e) => {
            debug!("clipboard text read failed: {e}");
            None
        }
    }
}

fn read_image(ctx: &ClipboardContext) -> Option<RgbaFrame> {
    if !ctx.has(ContentFormat::Image) {
        return None;
    }
    let png = match ctx.get_image().and_then(|image| image.to_png()) {
        Ok(png) => png,
        Err(e) => {
            debug!("clipboard image read failed: {e}");
            return None;
        }
    };
    match decode_png(png.get_bytes()) {
        Ok(frame) => Some(frame),
        Err(e) => {
            debug!("clipboard image conversion failed: {e}");
            None
        }
    }
}

/// `clipboard-rs` handler run on the watcher thread for every notification.
struct ChangeHandler {
    ctx: ClipboardContext,
    collector: ChangeCollector,
    tx: mpsc::Sender<LocalClipboardChange>,
}

impl ClipboardHandler for ChangeHandler {
    fn on_clipboard_change(&mut self) {
        if self.tx.is_closed() {
            return;
        }
        let text = if self.collector.watches(ClipboardFormat::Text) {
            read_text(&self.ctx)
        } else {
            None
        };
        let image = if self.collector.watches(ClipboardFormat::Image) {
            read_image(&self.ctx)
        } else {
            None
        };

        let changes = self.collector.collect(text, image);
        if !forward_changes(&self.tx, changes) {
            info!("clipboard consumer dropped; ignoring further clipboard changes");
        }
    }
}

/// Subscribes to the platform's clipboard change notifications.
#[derive(Debug, Default)]
pub struct WatchedClipboardSource;

impl WatchedClipboardSource {
    pub fn new() -> Self {
        Self
    }
}

impl ClipboardSource for WatchedClipboardSource {
    fn start(
        &self,
        formats: &[ClipboardFormat],
    ) -> Result<mpsc::Receiver<LocalClipboardChange>, ClipboardError> {
        let (tx, rx) = mpsc::channel(CHANGE_QUEUE_DEPTH);
        let (ready_tx, ready_rx) = std_mpsc::sync_channel(1);
        let collector = ChangeCollector::new(formats);

        thread::Builder::new()
            .name("copythrough-clipboard-watch".to_string())
            .spawn(move || {
                let ctx = match ClipboardContext::new().map_err(unavailable) {
                    Ok(ctx) => ctx,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let mut watcher = match ClipboardWatcherContext::new().map_err(unavailable) {
                    Ok(watcher) => watcher,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                // Dropping the shutdown handle would end the watch.
                let _shutdown = watcher
                    .add_handler(ChangeHandler { ctx, collector, tx })
                    .get_shutdown_channel();
                let _ = ready_tx.send(Ok(()));

                info!("clipboard watch started");
                watcher.start_watch();
                info!("clipboard watch stopped");
            })
            .map_err(|e| ClipboardError::Unavailable(e.to_string()))?;

        ready_rx
            .recv()
            .map_err(|_| ClipboardError::Unavailable("clipboard watcher thread died".to_string()))??;
        Ok(rx)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
