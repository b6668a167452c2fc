//! Presence poller: samples the shared file's existence on a fixed interval
//! and synthesizes [`ChangeEvent::Appeared`] when it shows up.
//!
//! The edge detection itself lives in [`PresenceTracker`]; this module only
//! drives it from a timer and turns edges into events.

use std::sync::Arc;
use std::time::Duration;

use copythrough_core::{PresenceEdge, PresenceTracker};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::application::change_detector::ChangeEvent;
use crate::application::ports::SharedFile;

/// Polls the shared file for existence changes.
pub struct PresencePoller {
    shared_file: Arc<dyn SharedFile>,
    interval: Duration,
    tracker: PresenceTracker,
}

impl PresencePoller {
    pub fn new(shared_file: Arc<dyn SharedFile>, interval: Duration) -> Self {
        Self {
            shared_file,
            interval,
            tracker: PresenceTracker::new(),
        }
    }

    /// Takes one sample and returns the resulting edge, if any.
    ///
    /// A `stat` failure leaves the tracked state untouched.
    pub async fn poll_once(&mut self) -> Option<PresenceEdge> {
        let exists = match self.shared_file.exists().await {
            Ok(exists) => exists,
            Err(e) => {
                debug!("stat {} failed: {e}", self.shared_file.path().display());
                return None;
            }
        };

        let edge = self.tracker.observe(exists);
        match edge {
            Some(PresenceEdge::Appeared) => {
                info!("{} appeared", self.shared_file.path().display())
            }
            Some(PresenceEdge::Vanished) => {
                info!("{} vanished", self.shared_file.path().display())
            }
            None => {}
        }
        edge
    }

    /// Polls until `tx` is closed, sending [`ChangeEvent::Appeared`] on
    /// every appearance.
    pub async fn run(mut self, tx: mpsc::Sender<ChangeEvent>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                _ = ticker.tick() => {}
            }

            if self.poll_once().await == Some(PresenceEdge::Appeared)
                && tx.send(ChangeEvent::Appeared).await.is_err()
            {
                break;
            }
        }
        debug!("presence channel closed; poller stopping");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::shared_file::mock::MemorySharedFile;

    const TICK: Duration = Duration::from_millis(10);

    #[tokio::test]
    async fn test_file_present_at_startup_appears_once() {
        // Arrange
        let file = Arc::new(MemorySharedFile::with_contents(vec![1]));
        let mut poller = PresencePoller::new(file, TICK);

        // Act
        let first = poller.poll_once().await;
        let second = poller.poll_once().await;

        // Assert
        assert_eq!(first, Some(PresenceEdge::Appeared));
        assert_eq!(second, None);
    }

    #[tokio::test]
    async fn test_absent_then_present_emits_appeared() {
        // Arrange
        let file = Arc::new(MemorySharedFile::new());
        let mut poller = PresencePoller::new(Arc::clone(&file) as Arc<dyn SharedFile>, TICK);
        assert_eq!(poller.poll_once().await, None);

        // Act
        file.set_contents(Some(vec![1]));

        // Assert
        assert_eq!(poller.poll_once().await, Some(PresenceEdge::Appeared));
    }

    #[tokio::test]
    async fn test_vanish_is_recorded_and_reappearance_detected() {
        // Arrange
        let file = Arc::new(MemorySharedFile::with_contents(vec![1]));
        let mut poller = PresencePoller::new(Arc::clone(&file) as Arc<dyn SharedFile>, TICK);
        poller.poll_once().await;

        // Act
        file.set_storage_present(false);
        let vanished = poller.poll_once().await;
        file.set_storage_present(true);
        file.set_contents(Some(vec![2]));
        let reappeared = poller.poll_once().await;

        // Assert
        assert_eq!(vanished, Some(PresenceEdge::Vanished));
        assert_eq!(reappeared, Some(PresenceEdge::Appeared));
    }

    #[tokio::test]
    async fn test_run_sends_appeared_event() {
        // Arrange
        let file = Arc::new(MemorySharedFile::new());
        let poller = PresencePoller::new(Arc::clone(&file) as Arc<dyn SharedFile>, TICK);
        let (tx, mut rx) = mpsc::channel(4);
        let task = tokio::spawn(poller.run(tx));

        // Act
        tokio::time::sleep(TICK * 3).await;
        file.set_contents(Some(vec![7]));

        // Assert
        let event = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("no presence event within 2s");
        assert_eq!(event, Some(ChangeEvent::Appeared));

        drop(rx);
        tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("poller did not stop after receiver was dropped")
            .unwrap();
    }
}
