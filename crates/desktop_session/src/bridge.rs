//! Glue between the reducer and the remote preference store: trailing
//! debounce for snapshot writes and optimistic-confirmation tracking for
//! icon positions.
//!
//! Both types are pure state machines driven by explicit timestamps so the
//! shell can feed them from its own timer source and tests can feed them
//! synthetic clocks.

use std::collections::BTreeMap;

use crate::model::{IconPoint, ShortcutId};

/// Quiet period for icon and widget layout writes.
pub const LAYOUT_DEBOUNCE_MS: u64 = 500;
/// Quiet period for the combined session snapshot.
pub const SESSION_DEBOUNCE_MS: u64 = 1000;

/// Matching distance when confirming an optimistic icon position against the
/// value echoed back by the remote store.
pub const ICON_CONFIRM_EPSILON: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
/// Trailing debounce over a snapshot type.
///
/// Every submission restarts the quiet period; the pending snapshot is
/// released by [`poll`](Self::poll) once the period elapses with no further
/// submissions. Submitting a snapshot equal to the last written one while
/// nothing is pending is dropped, so steady-state re-renders never schedule
/// writes.
pub struct TrailingDebounce<T: Clone + PartialEq> {
    quiet_ms: u64,
    pending: Option<T>,
    deadline_ms: u64,
    last_written: Option<T>,
}

impl<T: Clone + PartialEq> TrailingDebounce<T> {
    /// Creates a debouncer with the given quiet period.
    pub fn new(quiet_ms: u64) -> Self {
        Self {
            quiet_ms,
            pending: None,
            deadline_ms: 0,
            last_written: None,
        }
    }

    /// Submits a snapshot, restarting the quiet period.
    pub fn submit(&mut self, snapshot: T, now_ms: u64) {
        if self.pending.is_none() && self.last_written.as_ref() == Some(&snapshot) {
            return;
        }
        self.pending = Some(snapshot);
        self.deadline_ms = now_ms + self.quiet_ms;
    }

    /// Releases the pending snapshot if the quiet period has elapsed.
    pub fn poll(&mut self, now_ms: u64) -> Option<T> {
        if self.pending.is_some() && now_ms >= self.deadline_ms {
            return self.pending.take();
        }
        None
    }

    /// Records a completed write so identical future submissions are dropped.
    pub fn mark_written(&mut self, snapshot: T) {
        self.last_written = Some(snapshot);
    }

    /// Drops the pending snapshot without writing it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Whether a snapshot is waiting for its quiet period.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Timestamp at which the pending snapshot becomes releasable.
    pub fn deadline_ms(&self) -> u64 {
        self.deadline_ms
    }

    /// Takes the pending snapshot immediately, ignoring the quiet period.
    /// Used on page hide, when waiting out the debounce would lose the write.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Tracks icon positions written optimistically but not yet confirmed by the
/// remote store.
///
/// While a shortcut has an unconfirmed position, remote echoes for it are
/// suppressed so a slow round trip cannot yank the icon back to its old cell.
/// Confirmation clears the entry once the remote value lands within
/// [`ICON_CONFIRM_EPSILON`] of the optimistic one.
pub struct IconSyncGuard {
    pending: BTreeMap<ShortcutId, IconPoint>,
}

impl IconSyncGuard {
    /// Creates an empty guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an optimistic local write for `shortcut_id`.
    pub fn mark_optimistic(&mut self, shortcut_id: ShortcutId, position: IconPoint) {
        self.pending.insert(shortcut_id, position);
    }

    /// Drops the pending entry for a removed shortcut.
    pub fn forget(&mut self, shortcut_id: &ShortcutId) {
        self.pending.remove(shortcut_id);
    }

    /// Processes a remote echo for one shortcut. Clears the pending entry on
    /// an epsilon match and reports whether the remote value may be applied
    /// locally.
    pub fn confirm_from_remote(&mut self, shortcut_id: &ShortcutId, remote: IconPoint) -> bool {
        match self.pending.get(shortcut_id) {
            Some(optimistic) if optimistic.approx_eq(remote, ICON_CONFIRM_EPSILON) => {
                self.pending.remove(shortcut_id);
                true
            }
            Some(_) => false,
            None => true,
        }
    }

    /// Filters a remote position map down to entries safe to apply locally,
    /// clearing any pending entries the remote payload confirms.
    pub fn filter_remote(
        &mut self,
        remote: &BTreeMap<ShortcutId, IconPoint>,
    ) -> BTreeMap<ShortcutId, IconPoint> {
        remote
            .iter()
            .filter(|(id, point)| self.confirm_from_remote(id, **point))
            .map(|(id, point)| (id.clone(), *point))
            .collect()
    }

    /// Whether any optimistic write is still awaiting confirmation.
    pub fn is_syncing(&self) -> bool {
        !self.pending.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Aggregate write status across every namespace, feeding the taskbar sync
/// indicator.
///
/// A failed write leaves the status stale: local state stays authoritative
/// and the indicator shows unsaved changes until a later write succeeds.
pub struct SyncStatus {
    in_flight: u32,
    stale: bool,
}

impl SyncStatus {
    /// Records a write entering flight.
    pub fn begin_write(&mut self) {
        self.in_flight += 1;
    }

    /// Records a write leaving flight. Success clears staleness; failure
    /// sets it.
    pub fn finish_write(&mut self, succeeded: bool) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.stale = !succeeded;
    }

    /// Whether any write is currently in flight.
    pub fn is_syncing(&self) -> bool {
        self.in_flight > 0
    }

    /// Whether the most recent completed write failed.
    pub fn is_stale(&self) -> bool {
        self.stale
    }
}
