//! Integration tests for the clipboard relay.
//!
//! These tests run the application layer end-to-end with the in-memory
//! adapters: several "hosts" share one `MemorySharedFile` (or a real file
//! in a temp directory) the way real hosts share a USB stick.

use std::sync::Arc;
use std::time::Duration;

use copythrough_agent::application::apply_inbound::{ApplyInboundUseCase, InboundOutcome};
use copythrough_agent::application::change_detector::ChangeEvent;
use copythrough_agent::application::ports::{ClipboardSink, ClipboardSource, SharedFile};
use copythrough_agent::application::publish_outbound::{
    LocalClipboardChange, OutboundOutcome, PublishLocalUseCase,
};
use copythrough_agent::infrastructure::clipboard::mock::MockClipboard;
use copythrough_agent::infrastructure::relay::{run_relay, RelayPorts, RelayError};
use copythrough_agent::infrastructure::shared_file::mock::MemorySharedFile;
use copythrough_agent::infrastructure::shared_file::FsSharedFile;
use copythrough_agent::infrastructure::watcher::mock::MockWatch;
use copythrough_core::{encode_message, ClipboardFormat, ClipboardMessage, SyncConfig};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const POLL: Duration = Duration::from_millis(20);
const DEADLINE: Duration = Duration::from_secs(3);

// ── Helpers ───────────────────────────────────────────────────────────────────

fn config(dir: impl Into<std::path::PathBuf>, origin: &str) -> Arc<SyncConfig> {
    let mut config = SyncConfig::new(dir, origin);
    config.poll_interval = POLL;
    Arc::new(config)
}

fn encoded(origin: &str, text: &str) -> Vec<u8> {
    encode_message(&ClipboardMessage::new(
        origin,
        ClipboardFormat::Text,
        text.as_bytes().to_vec(),
    ))
    .unwrap()
}

/// Polls `condition` until it holds or the deadline passes.
async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let start = tokio::time::Instant::now();
    while start.elapsed() < DEADLINE {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}

/// One host running the full relay against shared storage.
struct Host {
    clipboard: Arc<MockClipboard>,
    native_tx: mpsc::Sender<ChangeEvent>,
    relay: JoinHandle<Result<(), RelayError>>,
}

fn start_host(config: Arc<SyncConfig>, shared_file: Arc<dyn SharedFile>) -> Host {
    start_host_with(config, shared_file, Arc::new(MockClipboard::new()))
}

fn start_host_with(
    config: Arc<SyncConfig>,
    shared_file: Arc<dyn SharedFile>,
    clipboard: Arc<MockClipboard>,
) -> Host {
    let local_changes = clipboard.start(&ClipboardFormat::ALL).unwrap();
    let (native_tx, native_rx) = mpsc::channel(16);
    let ports = RelayPorts {
        shared_file,
        clipboard: Arc::clone(&clipboard) as Arc<dyn ClipboardSink>,
        watch: Box::new(MockWatch::new()),
        native_events: native_rx,
        local_changes,
    };
    Host {
        clipboard,
        native_tx,
        relay: tokio::spawn(run_relay(config, ports)),
    }
}

/// Stands in for every host's native watch on one stick: each time the
/// stick is written, all hosts get a `Written` event.
fn fan_out_writes(
    stick: Arc<MemorySharedFile>,
    hosts: Vec<mpsc::Sender<ChangeEvent>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut seen = stick.write_count();
        loop {
            let count = stick.write_count();
            if count != seen {
                seen = count;
                for tx in &hosts {
                    let _ = tx.send(ChangeEvent::Written).await;
                }
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_host_b_applies_host_a_message_and_host_a_ignores_it() {
    // Arrange – two hosts plugged into the same stick
    let stick = Arc::new(MemorySharedFile::new());
    let publisher_a = PublishLocalUseCase::new(config("/media/usb", "host-a"), stick.clone());
    let clipboard_a = Arc::new(MockClipboard::new());
    let clipboard_b = Arc::new(MockClipboard::new());
    let inbound_a =
        ApplyInboundUseCase::new(config("/media/usb", "host-a"), stick.clone(), clipboard_a.clone());
    let inbound_b =
        ApplyInboundUseCase::new(config("/media/usb", "host-b"), stick.clone(), clipboard_b.clone());

    // Act
    let published = publisher_a
        .publish(LocalClipboardChange {
            format: ClipboardFormat::Text,
            payload: b"hello".to_vec(),
        })
        .await
        .unwrap();
    let on_b = inbound_b.handle_change(ChangeEvent::Written).await.unwrap();
    let on_a = inbound_a.handle_change(ChangeEvent::Written).await.unwrap();

    // Assert
    assert!(matches!(published, OutboundOutcome::Published(_)));
    assert!(matches!(on_b, InboundOutcome::Applied(ref m) if m.origin == "host-a"));
    assert!(matches!(on_a, InboundOutcome::Echo));
    assert_eq!(clipboard_b.writes(), vec![(ClipboardFormat::Text, b"hello".to_vec())]);
    assert_eq!(clipboard_a.write_count(), 0);
}

#[tokio::test]
async fn test_two_relays_sync_through_shared_file() {
    // Arrange
    let stick = Arc::new(MemorySharedFile::new());
    let a = start_host(config("/media/usb", "host-a"), stick.clone());
    let b = start_host(config("/media/usb", "host-b"), stick.clone());

    // Act – user copies on A; B's watcher reports the write
    assert!(a.clipboard.emit_change(ClipboardFormat::Text, b"hello".to_vec()).await);
    assert!(wait_until(|| stick.contents().is_some()).await, "A never published");
    b.native_tx.send(ChangeEvent::Written).await.unwrap();
    a.native_tx.send(ChangeEvent::Written).await.unwrap();

    // Assert
    // B may apply twice: once from its presence poller, once from the watcher.
    assert!(wait_until(|| b.clipboard.write_count() >= 1).await, "B never applied");
    assert_eq!(b.clipboard.writes()[0], (ClipboardFormat::Text, b"hello".to_vec()));
    tokio::time::sleep(POLL * 5).await;
    assert_eq!(a.clipboard.write_count(), 0, "A must not apply its own message");

    a.relay.abort();
    b.relay.abort();
}

#[tokio::test]
async fn test_file_appearing_without_native_event_is_applied() {
    // Arrange – MockWatch never fires, so only the presence poller can notice
    let stick = Arc::new(MemorySharedFile::new());
    let host = start_host(config("/media/usb", "host-b"), stick.clone());
    tokio::time::sleep(POLL * 3).await;

    // Act
    stick.set_contents(Some(encoded("host-a", "plugged in")));

    // Assert
    assert!(wait_until(|| host.clipboard.write_count() == 1).await);
    assert_eq!(host.clipboard.writes()[0].1, b"plugged in".to_vec());

    host.relay.abort();
}

#[tokio::test]
async fn test_content_present_at_startup_is_imported_once() {
    // Arrange
    let stick = Arc::new(MemorySharedFile::with_contents(encoded("host-a", "waiting")));

    // Act
    let host = start_host(config("/media/usb", "host-b"), stick.clone());

    // Assert
    assert!(wait_until(|| host.clipboard.write_count() == 1).await);
    tokio::time::sleep(POLL * 5).await;
    assert_eq!(host.clipboard.write_count(), 1);

    host.relay.abort();
}

#[tokio::test]
async fn test_directory_created_after_startup_is_picked_up() {
    // Arrange – the mount point does not exist yet
    let tmp = tempfile::tempdir().unwrap();
    let mount = tmp.path().join("usb");
    let config = config(&mount, "host-b");
    let file = Arc::new(FsSharedFile::new(config.shared_file_path()));
    let host = start_host(Arc::clone(&config), file);
    tokio::time::sleep(POLL * 3).await;

    // Act – the stick is mounted with a message from another host
    std::fs::create_dir(&mount).unwrap();
    let staged = mount.join("incoming.tmp");
    std::fs::write(&staged, encoded("host-a", "from the stick")).unwrap();
    std::fs::rename(&staged, config.shared_file_path()).unwrap();

    // Assert
    assert!(wait_until(|| host.clipboard.write_count() == 1).await);
    assert_eq!(host.clipboard.writes()[0].1, b"from the stick".to_vec());

    host.relay.abort();
}

#[tokio::test]
async fn test_malformed_file_does_not_stop_relay() {
    // Arrange – garbage on the stick at startup
    let stick = Arc::new(MemorySharedFile::with_contents(b"CT\x01garbage".to_vec()));
    let host = start_host(config("/media/usb", "host-b"), stick.clone());
    tokio::time::sleep(POLL * 3).await;

    // Act – a valid message arrives later
    stick.set_contents(Some(encoded("host-a", "valid")));
    host.native_tx.send(ChangeEvent::Written).await.unwrap();

    // Assert
    assert!(wait_until(|| host.clipboard.write_count() == 1).await);
    assert!(!host.relay.is_finished());

    host.relay.abort();
}

#[tokio::test]
async fn test_publish_while_stick_ejected_is_dropped_and_relay_continues() {
    // Arrange
    let stick = Arc::new(MemorySharedFile::new());
    stick.set_storage_present(false);
    let host = start_host(config("/media/usb", "host-a"), stick.clone());

    // Act
    assert!(host.clipboard.emit_change(ClipboardFormat::Text, b"lost".to_vec()).await);
    tokio::time::sleep(POLL * 3).await;
    stick.set_storage_present(true);
    assert!(host.clipboard.emit_change(ClipboardFormat::Text, b"kept".to_vec()).await);

    // Assert
    assert!(wait_until(|| stick.write_count() == 1).await);
    assert!(!host.relay.is_finished());

    host.relay.abort();
}

#[tokio::test]
async fn test_applied_message_reexported_by_clipboard_watcher_settles() {
    // Arrange – clipboards that report every content change, as real ones do
    let stick = Arc::new(MemorySharedFile::new());
    let a = start_host_with(
        config("/media/usb", "host-a"),
        stick.clone(),
        Arc::new(MockClipboard::with_echo()),
    );
    let b = start_host_with(
        config("/media/usb", "host-b"),
        stick.clone(),
        Arc::new(MockClipboard::with_echo()),
    );
    let fanout = fan_out_writes(stick.clone(), vec![a.native_tx.clone(), b.native_tx.clone()]);

    // Act – user copies on A; B applies it, its watcher sees the change and
    // B publishes the same content back
    assert!(a.clipboard.emit_change(ClipboardFormat::Text, b"hello".to_vec()).await);

    // Assert
    assert!(wait_until(|| b.clipboard.write_count() >= 1).await, "B never applied");
    assert!(wait_until(|| stick.write_count() == 2).await, "B never re-published");

    let settled = (stick.write_count(), a.clipboard.write_count(), b.clipboard.write_count());
    tokio::time::sleep(POLL * 10).await;
    assert_eq!(
        (stick.write_count(), a.clipboard.write_count(), b.clipboard.write_count()),
        settled,
        "hosts kept bouncing the same content"
    );

    let hello = (ClipboardFormat::Text, b"hello".to_vec());
    assert!(a.clipboard.writes().iter().all(|w| *w == hello));
    assert!(b.clipboard.writes().iter().all(|w| *w == hello));
    assert_eq!(a.clipboard.current(), Some(hello.clone()));
    assert_eq!(b.clipboard.current(), Some(hello));
    assert!(!a.relay.is_finished());
    assert!(!b.relay.is_finished());

    fanout.abort();
    a.relay.abort();
    b.relay.abort();
}
