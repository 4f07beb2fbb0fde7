/// # The editing pipeline
///
/// Every committed mutation flows through one path, in one order: raw
/// storage edit, range adjustment, marker adjustment, change-tracker
/// update, observer fan-out, undo record. Undo and redo replay inverse
/// operations through the same internal path, so collaborators can't
/// tell a replay from a fresh edit — except that the undo stack appends
/// mirror records instead of fresh ones.
///
/// The buffer owns everything: storage, the range and marker tables, the
/// observer registry, and the undo log live as sibling fields so each
/// pipeline stage borrows only what it touches.
#[derive(Debug)]
pub struct Buffer {
    name: String,
    storage: crate::storage::GapBuffer,
    ranges: crate::range::RangeSet,
    markers: crate::marker::MarkerSet,
    observers: crate::observer::ObserverList,
    trackers: crate::observer::TrackerSet,
    undo: crate::undo::UndoStack,

    undo_enabled: bool,
    read_only: bool,

    /// Monotonic: +1 per committed insert/delete, replays included.
    revision: u64,
    /// Like `revision`, but metadata changes (marker repaints) bump it too.
    version: u64,

    /// Modified tracking: forward edits raise the tick, undo steps lower
    /// it, redo steps raise it again. Unmodified means it equals the tick
    /// captured at the last save.
    char_tick: i64,
    save_tick: i64,
}

/*

==================================
========== CONSTRUCTION ==========
==================================

*/

impl Buffer {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            storage: crate::storage::GapBuffer::new(),
            ranges: crate::range::RangeSet::new(),
            markers: crate::marker::MarkerSet::new(),
            observers: crate::observer::ObserverList::new(),
            trackers: crate::observer::TrackerSet::new(),
            undo: crate::undo::UndoStack::new(),
            undo_enabled: true,
            read_only: false,
            revision: 0,
            version: 0,
            char_tick: 1,
            save_tick: 1,
        }
    }

    /// A buffer pre-filled with `text` as its unmodified baseline: no
    /// undo record, no tick movement.
    #[must_use]
    pub fn with_text(name: &str, text: &str) -> Self {
        let mut buffer = Self::new(name);
        buffer.storage = crate::storage::GapBuffer::with_text(text);
        buffer
    }
}

/*

==================================
======= INLINE ACCESSORS =========
==================================

*/

impl Buffer {
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[inline]
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Returns the previous value.
    pub fn set_read_only(&mut self, read_only: bool) -> bool {
        std::mem::replace(&mut self.read_only, read_only)
    }

    #[inline]
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.char_tick != self.save_tick
    }

    /// Called by whatever persists the buffer; from here on, undoing back
    /// to this exact state reads as unmodified again.
    pub fn mark_saved(&mut self) {
        self.save_tick = self.char_tick;
    }

    pub(crate) fn storage(&self) -> &crate::storage::GapBuffer {
        &self.storage
    }

    pub(crate) fn inc_char_tick(&mut self, delta: i64) {
        self.char_tick += delta;
    }
}

/*

==================================
=========== QUERIES ==============
==================================

*/

impl Buffer {
    pub fn char_at(&self, offset: usize) -> crate::errors::TextResult<char> {
        self.storage
            .char_at(offset)
            .ok_or(crate::errors::TextError::OffsetOutOfBounds {
                offset,
                len: self.len(),
            })
    }

    pub fn text(&self, start: usize, end: usize) -> crate::errors::TextResult<String> {
        self.check_range(start, end)?;
        Ok(self.storage.text(start, end))
    }

    pub fn chars(
        &self,
        start: usize,
        end: usize,
    ) -> crate::errors::TextResult<impl Iterator<Item = char> + '_> {
        self.check_range(start, end)?;
        Ok(self.storage.chars(start, end))
    }

    fn check_range(&self, start: usize, end: usize) -> crate::errors::TextResult<()> {
        if start > end || end > self.len() {
            return Err(crate::errors::TextError::InvalidRange {
                start,
                end,
                len: self.len(),
            });
        }
        Ok(())
    }
}

/*

==================================
===== INSERTION & DELETION =======
==================================

*/

impl Buffer {
    /// Inserts `text` before `offset`.
    ///
    /// Validation happens before any side effect; on success the edit has
    /// gone through the whole pipeline and is undoable.
    pub fn insert(&mut self, offset: usize, text: &str) -> crate::errors::TextResult<()> {
        if self.read_only {
            tracing::debug!(name = %self.name, "insert rejected: read-only");
            return Err(crate::errors::TextError::ReadOnly);
        }
        if offset > self.len() {
            return Err(crate::errors::TextError::OffsetOutOfBounds {
                offset,
                len: self.len(),
            });
        }
        if text.is_empty() {
            return Ok(());
        }

        let length = text.chars().count();
        self.internal_insert(offset, text);
        self.on_change();

        if self.undo_enabled {
            self.undo.checkpoint();
            if self.undo.record_insert(&self.storage, offset, offset + length) {
                // A coalesced keystroke is still the same undo step.
                self.char_tick -= 1;
            }
        }
        Ok(())
    }

    /// Deletes `[start, end)`.
    pub fn delete(&mut self, start: usize, end: usize) -> crate::errors::TextResult<()> {
        if self.read_only {
            tracing::debug!(name = %self.name, "delete rejected: read-only");
            return Err(crate::errors::TextError::ReadOnly);
        }
        self.check_range(start, end)?;
        if start == end {
            return Ok(());
        }

        // Snapshot before the characters vanish; the undo record needs
        // them once the observers have been told.
        let doomed = self.storage.text(start, end);
        self.internal_delete(start, end);
        self.on_change();

        if self.undo_enabled {
            self.undo.checkpoint();
            if self.undo.record_delete(start, end, &doomed) {
                self.char_tick -= 1;
            }
        }
        Ok(())
    }

    /// Replaces `[start, end)` with `text` as one undo step.
    pub fn replace(
        &mut self,
        start: usize,
        end: usize,
        text: &str,
    ) -> crate::errors::TextResult<()> {
        if self.read_only {
            return Err(crate::errors::TextError::ReadOnly);
        }
        self.check_range(start, end)?;

        self.start_undo_group("replace");
        let result = self
            .delete(start, end)
            .and_then(|()| self.insert(start, text));
        self.end_undo_group("replace");
        result
    }

    /// Raw mutation plus everything that must see it, minus undo
    /// recording. Undo/redo replay lands here directly.
    pub(crate) fn internal_insert(&mut self, offset: usize, text: &str) {
        let length = text.chars().count();
        if length == 0 {
            return;
        }
        self.storage.insert(offset, text);
        self.ranges.did_insert_before(offset, length);
        self.markers.did_insert_before(offset, length);
        self.trackers
            .did_change(offset, offset + length, self.storage.len());
        self.observers.notify_insert(offset, length);
        self.revision += 1;
        self.version += 1;
    }

    pub(crate) fn internal_delete(&mut self, start: usize, end: usize) {
        if start == end {
            return;
        }
        let length = end - start;
        self.storage.delete(start, end);
        self.ranges.did_delete_at(start, length);
        self.markers.did_delete_at(start, length);
        self.trackers.did_change(start, start, self.storage.len());
        self.observers.notify_delete(start, length);
        self.revision += 1;
        self.version += 1;
    }

    fn on_change(&mut self) {
        // A fresh edit can never tick back onto a saved state that undo
        // steps already walked away from.
        if self.char_tick < self.save_tick {
            self.char_tick = self.save_tick;
        }
        self.char_tick += 1;
    }
}

/*

==================================
========= UNDO & REDO ============
==================================

*/

impl Buffer {
    /// Undoes one step if `position` sits at the expected pre-undo caret;
    /// otherwise returns that expected position untouched so the caller
    /// can snap there first. `None` when there is nothing to undo.
    pub fn undo(&mut self, position: usize) -> Option<usize> {
        if self.read_only || !self.undo_enabled {
            return None;
        }
        let mut undo = std::mem::take(&mut self.undo);
        let result = undo.undo(self, position, 1);
        self.undo = undo;
        result
    }

    /// The forward mirror of `undo`.
    pub fn redo(&mut self, position: usize) -> Option<usize> {
        if self.read_only || !self.undo_enabled {
            return None;
        }
        let mut undo = std::mem::take(&mut self.undo);
        let result = undo.redo(self, position, 1);
        self.undo = undo;
        result
    }

    pub fn start_undo_group(&mut self, name: &str) {
        self.undo.checkpoint();
        self.undo.record_begin(name);
    }

    pub fn end_undo_group(&mut self, name: &str) {
        self.undo.checkpoint();
        self.undo.record_end(name);
    }

    /// Runs `f` inside a named undo group.
    pub fn undo_group<T>(&mut self, name: &str, f: impl FnOnce(&mut Self) -> T) -> T {
        self.start_undo_group(name);
        let result = f(self);
        self.end_undo_group(name);
        result
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.undo_enabled && self.undo.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.undo_enabled && self.undo.can_redo()
    }

    /// Discards the whole undo log.
    pub fn clear_undo(&mut self) {
        self.undo.clear();
    }

    /// Approximate bytes held by the undo log.
    #[must_use]
    pub fn undo_size(&self) -> usize {
        self.undo.size()
    }

    /// Returns the previous value.
    pub fn enable_undo(&mut self, enabled: bool) -> bool {
        self.undo.set_enabled(enabled);
        std::mem::replace(&mut self.undo_enabled, enabled)
    }
}

/*

==================================
======= RANGES & MARKERS =========
==================================

*/

impl Buffer {
    /// Registers a live range. The pair is ordered and clamped into the
    /// buffer, matching how callers hand in unnormalized selections.
    pub fn create_range(&mut self, start: usize, end: usize) -> crate::range::RangeId {
        let len = self.len();
        let lo = start.min(end).min(len);
        let hi = start.max(end).min(len);
        self.ranges.insert(lo, hi)
    }

    pub fn remove_range(&mut self, id: crate::range::RangeId) -> Option<crate::range::TrackedRange> {
        self.ranges.remove(id)
    }

    #[must_use]
    pub fn range(&self, id: crate::range::RangeId) -> Option<crate::range::TrackedRange> {
        self.ranges.get(id)
    }

    /// Repositions a live range; false for a dead id.
    pub fn set_range(&mut self, id: crate::range::RangeId, start: usize, end: usize) -> bool {
        let len = self.len();
        let lo = start.min(end).min(len);
        let hi = start.max(end).min(len);
        self.ranges.set(id, lo, hi)
    }

    /// Paints `[start, end)` with `kind`; bumps `version()` and notifies
    /// the style channel once per sub-span that actually changed.
    pub fn set_marker(
        &mut self,
        start: usize,
        end: usize,
        kind: &str,
    ) -> crate::errors::TextResult<()> {
        self.check_range(start, end)?;
        if start == end {
            return Ok(());
        }
        let changes = self.markers.set(start, end, kind);
        for (changed_start, changed_end) in changes {
            self.version += 1;
            self.observers.notify_style(changed_start, changed_end);
        }
        Ok(())
    }

    pub fn clear_marker(&mut self, start: usize, end: usize) -> crate::errors::TextResult<()> {
        self.check_range(start, end)?;
        if start == end {
            return Ok(());
        }
        let changes = self.markers.clear(start, end);
        for (changed_start, changed_end) in changes {
            self.version += 1;
            self.observers.notify_style(changed_start, changed_end);
        }
        Ok(())
    }

    #[must_use]
    pub fn marker_at(&self, offset: usize) -> Option<&crate::marker::Marker> {
        self.markers.marker_at(offset)
    }
}

/*

==================================
====== OBSERVERS & TRACKERS ======
==================================

*/

impl Buffer {
    pub fn add_observer(
        &mut self,
        observer: Box<dyn crate::observer::BufferMutationObserver>,
    ) -> crate::observer::ObserverId {
        self.observers.add(observer)
    }

    /// Removing an id that is not registered is a no-op.
    pub fn remove_observer(&mut self, id: crate::observer::ObserverId) -> bool {
        self.observers.remove(id)
    }

    pub fn register_change_tracker(&mut self) -> crate::observer::TrackerId {
        self.trackers.register()
    }

    pub fn unregister_change_tracker(&mut self, id: crate::observer::TrackerId) {
        self.trackers.unregister(id);
    }

    pub fn reset_change_tracker(&mut self, id: crate::observer::TrackerId) {
        self.trackers.reset(id);
    }

    #[must_use]
    pub fn change_span(&self, id: crate::observer::TrackerId) -> Option<crate::observer::ChangeSpan> {
        self.trackers.span(id)
    }
}

impl std::fmt::Display for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.storage)
    }
}



#[cfg(test)]
mod buffer_group_tests {
    use super::*;

    #[test]
    fn test_group_undoes_atomically() {
        let mut buffer = Buffer::new("scratch");
        buffer.undo_group("edit", |buffer| {
            buffer.insert(0, "foo\n").unwrap();
            buffer.insert(4, "bar").unwrap();
        });
        assert_eq!(buffer.to_string(), "foo\nbar");

        assert_eq!(buffer.undo(7), Some(0), "one undo reverts both edits");
        assert_eq!(buffer.to_string(), "");
        assert!(!buffer.can_undo());
        assert_eq!(buffer.undo(0), None);

        assert_eq!(buffer.redo(0), Some(7), "one redo replays both edits");
        assert_eq!(buffer.to_string(), "foo\nbar");
    }

    #[test]
    fn test_empty_group_leaves_no_trace() {
        let mut buffer = Buffer::with_text("scratch", "abc");
        let could_undo = buffer.can_undo();

        buffer.start_undo_group("nothing");
        buffer.end_undo_group("nothing");

        assert_eq!(buffer.can_undo(), could_undo);
        assert_eq!(buffer.undo_size(), 0);
    }

    #[test]
    fn test_two_plain_groups_undo_separately() {
        let mut buffer = Buffer::new("scratch");
        buffer.undo_group("test", |buffer| buffer.insert(0, "foo").unwrap());
        buffer.undo_group("test", |buffer| buffer.insert(3, "bar").unwrap());
        assert_eq!(buffer.to_string(), "foobar");

        assert_eq!(buffer.undo(6), Some(3), "second group comes off first");
        assert_eq!(buffer.to_string(), "foo");
        assert_eq!(buffer.undo(3), Some(0));
        assert_eq!(buffer.to_string(), "");
    }

    #[test]
    fn test_star_groups_fuse_into_one_step() {
        let mut buffer = Buffer::new("scratch");
        buffer.undo_group("*typing", |buffer| buffer.insert(0, "fo").unwrap());
        buffer.undo_group("*typing", |buffer| buffer.insert(2, "o").unwrap());
        assert_eq!(buffer.to_string(), "foo");

        assert_eq!(buffer.undo(3), Some(0), "fused groups undo together");
        assert_eq!(buffer.to_string(), "");
    }

    #[test]
    fn test_nested_groups_undo_as_one_unit() {
        let mut buffer = Buffer::new("scratch");
        buffer.undo_group("outer", |buffer| {
            buffer.insert(0, "one\n").unwrap();
            buffer.undo_group("inner", |buffer| {
                buffer.insert(4, "two\n").unwrap();
            });
            buffer.insert(8, "three").unwrap();
        });
        assert_eq!(buffer.to_string(), "one\ntwo\nthree");

        assert_eq!(buffer.undo(13), Some(0));
        assert_eq!(buffer.to_string(), "");

        assert_eq!(buffer.redo(0), Some(13));
        assert_eq!(buffer.to_string(), "one\ntwo\nthree");
    }
}
