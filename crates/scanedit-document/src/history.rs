// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Linear edit history with branch truncation.

use std::sync::Arc;

use scanedit_core::AdjustmentParams;
use tracing::debug;

use crate::raster::RasterImage;

/// One committed, replayable state.
///
/// Images are shared, so stepping through history never copies pixels.
/// `baseline` is the original that previews were computed from when the
/// entry was made; restoring an entry restores both.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub result: Arc<RasterImage>,
    pub baseline: Arc<RasterImage>,
    pub params: AdjustmentParams,
}

impl HistoryEntry {
    /// Entry for an image with no pending adjustments: result and baseline
    /// are the same buffer.
    pub fn neutral(image: Arc<RasterImage>) -> Self {
        Self {
            result: Arc::clone(&image),
            baseline: image,
            params: AdjustmentParams::NEUTRAL,
        }
    }
}

/// Ordered entries plus a cursor. Never empty; the cursor is always a valid
/// index.
#[derive(Debug, Clone)]
pub struct EditHistory {
    entries: Vec<HistoryEntry>,
    index: usize,
}

impl EditHistory {
    /// Start a history whose only entry is the as-loaded state.
    pub fn seeded(entry: HistoryEntry) -> Self {
        Self {
            entries: vec![entry],
            index: 0,
        }
    }

    /// Drop everything after the cursor, append `entry` and move onto it.
    pub fn commit(&mut self, entry: HistoryEntry) {
        let discarded = self.entries.len() - self.index - 1;
        self.entries.truncate(self.index + 1);
        self.entries.push(entry);
        self.index = self.entries.len() - 1;
        debug!(index = self.index, discarded, "history commit");
    }

    /// Step back one entry. Returns the entry to restore, or `None` at the
    /// start of history.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        debug!(index = self.index, "undo");
        Some(&self.entries[self.index])
    }

    /// Step forward one entry. Returns the entry to restore, or `None` at the
    /// end of history.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        debug!(index = self.index, "redo");
        Some(&self.entries[self.index])
    }

    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.index]
    }

    /// The as-loaded entry.
    pub fn first(&self) -> &HistoryEntry {
        &self.entries[0]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(brightness: u8) -> HistoryEntry {
        let image = Arc::new(RasterImage::filled(2, 2, [brightness; 4]).unwrap());
        HistoryEntry {
            result: Arc::clone(&image),
            baseline: image,
            params: AdjustmentParams::NEUTRAL.with_brightness(brightness).unwrap(),
        }
    }

    fn brightness_trail(history: &EditHistory) -> Vec<u8> {
        history.entries().iter().map(|e| e.params.brightness).collect()
    }

    #[test]
    fn commit_after_undo_discards_redo_branch() {
        let mut history = EditHistory::seeded(entry(50));
        history.commit(entry(60)); // A
        history.commit(entry(70)); // B
        assert!(history.undo().is_some());
        history.commit(entry(80)); // C
        assert_eq!(brightness_trail(&history), vec![50, 60, 80]);
        assert_eq!(history.index(), 2);
        assert!(!history.can_redo());
    }

    #[test]
    fn undo_and_redo_stop_at_the_ends() {
        let mut history = EditHistory::seeded(entry(50));
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        assert_eq!(history.index(), 0);

        history.commit(entry(60));
        assert_eq!(history.undo().map(|e| e.params.brightness), Some(50));
        assert_eq!(history.redo().map(|e| e.params.brightness), Some(60));
        assert!(history.redo().is_none());
        assert_eq!(history.current().params.brightness, 60);
    }

    #[test]
    fn history_is_never_empty() {
        let mut history = EditHistory::seeded(entry(50));
        for _ in 0..3 {
            history.undo();
        }
        assert_eq!(history.len(), 1);
        assert!(!history.is_empty());
        assert_eq!(history.first(), history.current());
    }

    #[test]
    fn neutral_entry_shares_one_buffer() {
        let image = Arc::new(RasterImage::filled(1, 1, [9; 4]).unwrap());
        let e = HistoryEntry::neutral(Arc::clone(&image));
        assert!(Arc::ptr_eq(&e.result, &e.baseline));
        assert!(e.params.is_neutral());
    }
}
