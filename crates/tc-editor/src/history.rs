//! Undo/redo history.
//!
//! Every structural change pushes a full snapshot of the field list plus the
//! selection. Snapshots are cheap to keep because the session never mutates a
//! field list in place: each entry shares its `Arc` with the session until
//! the next edit replaces it.
//!
//! Two mechanisms keep continuous gestures from flooding the stack:
//!
//! - **Debounce**: a snapshot taken within `debounce_ms` of the previous one
//!   replaces the tail entry instead of appending.
//! - **Gesture brackets**: between `begin_gesture` and `end_gesture` every
//!   snapshot after the first replaces the tail, however long the gesture
//!   takes. Opening a gesture, closing one, `undo`, and `redo` all seal the
//!   tail so the next snapshot always starts a new entry.

use std::collections::VecDeque;
use std::sync::Arc;
use tc_core::{Field, FieldId};

/// One undo step: the whole field list and what was selected.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub fields: Arc<Vec<Field>>,
    pub selected: Option<FieldId>,
}

/// Bounded list of entries with a cursor. `entries[cursor]` is the state
/// the session currently shows.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    cursor: usize,
    max_depth: usize,
    debounce_ms: f64,
    /// Time of the last snapshot that reached the tail.
    last_snapshot_ms: Option<f64>,
    /// Gesture nesting depth (0 = not in a gesture).
    gesture_depth: usize,
    /// Whether the open gesture has already pushed its entry.
    gesture_entry: bool,
    /// The tail must not be replaced by the next snapshot.
    sealed: bool,
}

impl History {
    /// Start a history whose only entry is `initial`.
    pub fn new(initial: HistoryEntry, max_depth: usize, debounce_ms: f64) -> Self {
        let max_depth = max_depth.max(1);
        let mut entries = VecDeque::with_capacity(max_depth.min(64));
        entries.push_back(initial);
        Self {
            entries,
            cursor: 0,
            max_depth,
            debounce_ms,
            last_snapshot_ms: None,
            gesture_depth: 0,
            gesture_entry: false,
            sealed: true,
        }
    }

    /// Drop every entry and start over from `initial`.
    pub fn reset(&mut self, initial: HistoryEntry) {
        self.entries.clear();
        self.entries.push_back(initial);
        self.cursor = 0;
        self.last_snapshot_ms = None;
        self.gesture_entry = false;
        self.sealed = true;
    }

    /// Record `entry` as the new current state at time `now_ms`.
    ///
    /// Truncates any redo tail. Coalesces into the tail entry when inside a
    /// gesture that already pushed, or when the previous snapshot was less
    /// than the debounce window ago and nothing sealed the tail since.
    pub fn snapshot(&mut self, entry: HistoryEntry, now_ms: f64) {
        let at_tail = self.cursor + 1 == self.entries.len();
        let coalesce = at_tail
            && if self.gesture_depth > 0 {
                self.gesture_entry
            } else {
                !self.sealed
                    && self
                        .last_snapshot_ms
                        .is_some_and(|t| now_ms - t < self.debounce_ms)
            };

        if coalesce && let Some(tail) = self.entries.back_mut() {
            *tail = entry;
        } else {
            self.entries.truncate(self.cursor + 1);
            self.entries.push_back(entry);
            if self.entries.len() > self.max_depth {
                self.entries.pop_front();
                log::debug!("history full ({}), evicted oldest entry", self.max_depth);
            }
            self.cursor = self.entries.len() - 1;
        }

        self.last_snapshot_ms = Some(now_ms);
        self.sealed = false;
        if self.gesture_depth > 0 {
            self.gesture_entry = true;
        }
        log::trace!(
            "snapshot: {} entr{}, cursor {}, coalesced {coalesce}",
            self.entries.len(),
            if self.entries.len() == 1 { "y" } else { "ies" },
            self.cursor
        );
    }

    /// Open a gesture bracket. Nested brackets join the outermost one.
    pub fn begin_gesture(&mut self) {
        if self.gesture_depth == 0 {
            self.sealed = true;
            self.gesture_entry = false;
        }
        self.gesture_depth += 1;
    }

    /// Close a gesture bracket. Unbalanced calls are ignored.
    pub fn end_gesture(&mut self) {
        if self.gesture_depth == 0 {
            return;
        }
        self.gesture_depth -= 1;
        if self.gesture_depth == 0 {
            self.sealed = true;
            self.gesture_entry = false;
        }
    }

    pub fn in_gesture(&self) -> bool {
        self.gesture_depth > 0
    }

    /// Step back one entry. Returns the entry to restore, or `None` at the
    /// oldest entry.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.sealed = true;
        self.entries.get(self.cursor)
    }

    /// Step forward one entry. Returns the entry to restore, or `None` at
    /// the newest entry.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.sealed = true;
        self.entries.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.cursor)
    }

    /// Change the depth bound and debounce window. Shrinking drops redo
    /// entries first, then the oldest undo entries; `entries[cursor]` is
    /// never evicted.
    pub fn set_limits(&mut self, max_depth: usize, debounce_ms: f64) {
        self.max_depth = max_depth.max(1);
        self.debounce_ms = debounce_ms;
        let excess = self.entries.len().saturating_sub(self.max_depth);
        if excess == 0 {
            return;
        }
        let redo = self.entries.len() - self.cursor - 1;
        let from_back = excess.min(redo);
        self.entries.truncate(self.entries.len() - from_back);
        let from_front = excess - from_back;
        self.entries.drain(..from_front);
        self.cursor -= from_front;
        log::debug!(
            "history shrunk to {}: dropped {from_back} redo, {from_front} undo",
            self.max_depth
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tc_core::{FieldType, StagingElement, create_field};

    /// An entry holding `n` distinct fields, so entries compare by `n`.
    fn entry(n: usize) -> HistoryEntry {
        let staging = StagingElement::new(FieldType::Text);
        let fields = (0..n)
            .map(|i| {
                let id = FieldId::intern(&format!("h{i}"));
                create_field(&staging, id, "t", "T", i, 1.0)
            })
            .collect();
        HistoryEntry {
            fields: Arc::new(fields),
            selected: None,
        }
    }

    fn count(h: &History) -> usize {
        h.current().map(|e| e.fields.len()).unwrap_or_default()
    }

    #[test]
    fn snapshots_outside_window_append() {
        let mut h = History::new(entry(0), 50, 100.0);
        h.snapshot(entry(1), 0.0);
        h.snapshot(entry(2), 200.0);
        h.snapshot(entry(3), 400.0);
        assert_eq!(h.len(), 4);
        assert_eq!(h.cursor(), 3);
        assert!(h.can_undo());
        assert!(!h.can_redo());
    }

    #[test]
    fn rapid_snapshots_collapse() {
        let mut h = History::new(entry(0), 50, 100.0);
        for i in 1..=10 {
            h.snapshot(entry(i), i as f64 * 16.0);
        }
        assert_eq!(h.len(), 2);
        assert_eq!(count(&h), 10);
    }

    #[test]
    fn gesture_collapses_regardless_of_time() {
        let mut h = History::new(entry(0), 50, 100.0);
        h.snapshot(entry(1), 0.0);
        h.begin_gesture();
        // Within the debounce window of the previous snapshot, but the
        // gesture seals it, so this starts a new entry.
        h.snapshot(entry(2), 10.0);
        h.snapshot(entry(3), 5_000.0);
        h.snapshot(entry(4), 90_000.0);
        h.end_gesture();
        assert_eq!(h.len(), 3);
        assert_eq!(count(&h), 4);

        // Closing the gesture sealed the tail.
        h.snapshot(entry(5), 90_010.0);
        assert_eq!(h.len(), 4);
    }

    #[test]
    fn undo_redo_walk_the_cursor() {
        let mut h = History::new(entry(0), 50, 0.0);
        h.snapshot(entry(1), 0.0);
        h.snapshot(entry(2), 1.0);
        assert_eq!(h.undo().map(|e| e.fields.len()), Some(1));
        assert_eq!(h.undo().map(|e| e.fields.len()), Some(0));
        assert_eq!(h.undo(), None);
        assert_eq!(h.redo().map(|e| e.fields.len()), Some(1));
        assert_eq!(h.redo().map(|e| e.fields.len()), Some(2));
        assert_eq!(h.redo(), None);
    }

    #[test]
    fn edit_after_undo_truncates_redo() {
        let mut h = History::new(entry(0), 50, 100.0);
        h.snapshot(entry(1), 0.0);
        h.snapshot(entry(2), 500.0);
        h.undo();
        // Within the window, but undo sealed the tail and the cursor is
        // not at the tail anyway.
        h.snapshot(entry(5), 510.0);
        assert_eq!(h.len(), 3);
        assert_eq!(count(&h), 5);
        assert!(!h.can_redo());
    }

    #[test]
    fn depth_bound_evicts_oldest() {
        let mut h = History::new(entry(0), 3, 0.0);
        for i in 1..=5 {
            h.snapshot(entry(i), i as f64);
        }
        assert_eq!(h.len(), 3);
        assert_eq!(h.undo().map(|e| e.fields.len()), Some(4));
        assert_eq!(h.undo().map(|e| e.fields.len()), Some(3));
        assert_eq!(h.undo(), None);
    }

    #[test]
    fn shrinking_after_undo_keeps_current_entry() {
        let mut h = History::new(entry(0), 50, 0.0);
        for i in 1..=8 {
            h.snapshot(entry(i), i as f64);
        }
        while h.undo().is_some() {}
        assert_eq!(count(&h), 0);

        h.set_limits(3, 0.0);
        assert_eq!(h.len(), 3);
        assert_eq!(h.cursor(), 0);
        assert_eq!(count(&h), 0);
        assert!(!h.can_undo());
        assert_eq!(h.redo().map(|e| e.fields.len()), Some(1));
        h.undo();

        // The next edit must undo back to the state that was showing.
        h.snapshot(entry(42), 100.0);
        assert_eq!(h.undo().map(|e| e.fields.len()), Some(0));
    }

    #[test]
    fn shrinking_mid_history_drops_redo_first() {
        let mut h = History::new(entry(0), 50, 0.0);
        for i in 1..=6 {
            h.snapshot(entry(i), i as f64);
        }
        h.undo();
        h.undo();
        assert_eq!(count(&h), 4);

        // 7 entries, cursor at 4: two redo entries go, then two oldest.
        h.set_limits(3, 0.0);
        assert_eq!(h.len(), 3);
        assert_eq!(count(&h), 4);
        assert!(!h.can_redo());
        assert_eq!(h.undo().map(|e| e.fields.len()), Some(3));
        assert_eq!(h.undo().map(|e| e.fields.len()), Some(2));
        assert_eq!(h.undo(), None);
    }

    #[test]
    fn unbalanced_end_gesture_is_ignored() {
        let mut h = History::new(entry(0), 50, 100.0);
        h.end_gesture();
        assert!(!h.in_gesture());
        h.begin_gesture();
        h.begin_gesture();
        h.end_gesture();
        assert!(h.in_gesture());
        h.end_gesture();
        assert!(!h.in_gesture());
    }

    #[test]
    fn reset_forgets_everything() {
        let mut h = History::new(entry(0), 50, 100.0);
        h.snapshot(entry(1), 0.0);
        h.reset(entry(7));
        assert_eq!(h.len(), 1);
        assert_eq!(count(&h), 7);
        assert!(!h.can_undo());
    }
}
