//! Presence state machine for the shared file.
//!
//! Native file notifications only fire for paths that already exist.  When
//! the shared file appears because a USB stick was plugged in (rather than
//! because a process wrote it), nothing fires.  The presence poller covers
//! that gap by sampling the file's existence on a fixed interval and feeding
//! each sample into a [`PresenceTracker`], which reports the edges.
//!
//! ```text
//!             exists                         !exists
//!   ┌────────┐ ───────► Appeared ┌─────────┐ ───────► Vanished ┌────────┐
//!   │ Absent │                   │ Present │                   │ Absent │
//!   └────────┘ ◄─────────────────└─────────┘                   └────────┘
//! ```
//!
//! The tracker starts with no observation at all.  The first sample counts as
//! a transition: it yields [`PresenceEdge::Appeared`] if and only if the file
//! exists at that moment, so content already on the stick at startup is
//! imported exactly once.

/// Whether the shared file currently exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceState {
    Absent,
    Present,
}

impl From<bool> for PresenceState {
    fn from(exists: bool) -> Self {
        if exists {
            PresenceState::Present
        } else {
            PresenceState::Absent
        }
    }
}

/// A transition of the shared file's existence status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceEdge {
    /// The file became visible.  Its current contents must be processed.
    Appeared,
    /// The file disappeared.  Nothing to read.
    Vanished,
}

/// Tracks the last observed [`PresenceState`] and reports edges.
#[derive(Debug, Default, Clone)]
pub struct PresenceTracker {
    last: Option<PresenceState>,
}

impl PresenceTracker {
    /// Creates a tracker that has not observed anything yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last observed state, or `None` before the first sample.
    pub fn state(&self) -> Option<PresenceState> {
        self.last
    }

    /// Records one existence sample and returns the edge it caused, if any.
    pub fn observe(&mut self, exists: bool) -> Option<PresenceEdge> {
        let current = PresenceState::from(exists);
        let previous = self.last.replace(current);
        match (previous, current) {
            (Some(PresenceState::Present), PresenceState::Present)
            | (Some(PresenceState::Absent), PresenceState::Absent) => None,
            (None | Some(PresenceState::Absent), PresenceState::Present) => {
                Some(PresenceEdge::Appeared)
            }
            (Some(PresenceState::Present), PresenceState::Absent) => Some(PresenceEdge::Vanished),
            // First sample and nothing there: record only.
            (None, PresenceState::Absent) => None,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
