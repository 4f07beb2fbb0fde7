/// One entry in the edit log.
///
/// `Insert` carries no characters: the inserted text still lives in the
/// buffer, and undoing it snapshots the span into the mirror `Delete`
/// record at the moment it disappears. `Delete` owns the removed text,
/// since that is the only copy left.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// Opens a named group; everything up to the matching `End` undoes as
    /// one step. A leading `*` in the name lets consecutive same-named
    /// groups fuse into one.
    Begin { name: String },
    /// Closes a group.
    End { name: String },
    /// A committed insertion of `[start, end)`.
    Insert { start: usize, end: usize },
    /// A committed deletion of `[start, end)` with the removed text.
    Delete {
        start: usize,
        end: usize,
        text: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoState {
    /// Recording forward edits.
    Log,
    /// Mid-walk backward through the log.
    Undo,
    /// Walking forward again after an undo.
    Redo,
    /// Recording suppressed; every `record_*` call is a no-op.
    Disabled,
}

/*

=============================
========= THE LOG ===========
=============================

*/

/// The undo/redo log: an append-at-tail record list with two index
/// cursors walking it.
///
/// Undoing a record replays its inverse through the buffer's internal
/// mutation path and appends a mirror record at the tail, so the log
/// stays a linear history; redo walks tail-ward over those mirrors and
/// re-executes them. Cursors survive every log operation because records
/// are only ever appended, popped, or truncated as a suffix strictly past
/// both cursors.
#[derive(Debug)]
pub struct UndoStack {
    records: Vec<Record>,
    state: UndoState,
    /// Next record to undo, walking toward index 0.
    undo_cursor: Option<usize>,
    /// Next record to redo, also walking toward index 0.
    redo_cursor: Option<usize>,
    /// Running byte estimate of the log.
    size: usize,
}

impl UndoStack {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            state: UndoState::Log,
            undo_cursor: None,
            redo_cursor: None,
            size: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> UndoState {
        self.state
    }

    /// Approximate bytes held by the log; the policy layer decides what
    /// to do when this grows too large (typically `clear()`).
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        match self.state {
            UndoState::Log => !self.records.is_empty(),
            UndoState::Redo => true,
            UndoState::Undo => self.undo_cursor.is_some(),
            UndoState::Disabled => false,
        }
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.undo_cursor != self.redo_cursor
    }

    /// Discards the whole log in one step.
    pub fn clear(&mut self) {
        if !self.records.is_empty() {
            tracing::debug!(records = self.records.len(), "clearing undo log");
        }
        self.records.clear();
        self.state = UndoState::Log;
        self.undo_cursor = None;
        self.redo_cursor = None;
        self.size = 0;
    }

    /// Enables or disables recording. Disabling finalizes any in-progress
    /// undo/redo walk first so the log stays consistent.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled {
            if self.state == UndoState::Disabled {
                self.state = UndoState::Log;
            }
        } else if self.state != UndoState::Disabled {
            self.checkpoint();
            self.state = UndoState::Disabled;
        }
    }

    /// Returns to `Log` state before a fresh edit is recorded.
    ///
    /// Editing away from an undo or redo walk forfeits the abandoned
    /// branch: the suffix past the active cursor is discarded, so the log
    /// never forks and `can_redo()` turns false.
    pub fn checkpoint(&mut self) {
        match self.state {
            UndoState::Disabled => return,
            UndoState::Undo => self.truncate_after(self.undo_cursor),
            UndoState::Redo => self.truncate_after(self.redo_cursor),
            UndoState::Log => {}
        }
        self.undo_cursor = None;
        self.redo_cursor = None;
        self.state = UndoState::Log;
    }

    fn truncate_after(&mut self, cursor: Option<usize>) {
        let keep = cursor.map_or(0, |index| index + 1);
        if keep >= self.records.len() {
            return;
        }
        tracing::debug!(
            discarded = self.records.len() - keep,
            "truncating undo log"
        );
        for record in self.records.drain(keep..) {
            self.size -= footprint(&record);
        }
    }

    fn push(&mut self, record: Record) {
        self.size += footprint(&record);
        self.records.push(record);
    }

    fn pop(&mut self) {
        if let Some(record) = self.records.pop() {
            debug_assert!(self.undo_cursor.is_none_or(|c| c < self.records.len()));
            debug_assert!(self.redo_cursor.is_none_or(|c| c < self.records.len()));
            self.size -= footprint(&record);
        }
    }

    /*

    =============================
    ======== RECORDING ==========
    =============================

    */

    /// Opens a group. Consecutive groups with the same `*`-prefixed name
    /// fuse: the boundary `End` is deleted and this `Begin` is skipped,
    /// so a typing burst keeps extending one undo unit.
    pub fn record_begin(&mut self, name: &str) {
        if self.state == UndoState::Disabled {
            return;
        }
        if self.state == UndoState::Log
            && let Some(Record::End { name: last }) = self.records.last()
            && last == name
            && name.starts_with('*')
        {
            self.pop();
            return;
        }
        self.push(Record::Begin {
            name: name.to_string(),
        });
    }

    /// Closes a group. A group with no edit records inside is elided
    /// entirely: the dangling `Begin` is deleted instead.
    pub fn record_end(&mut self, name: &str) {
        if self.state == UndoState::Disabled {
            return;
        }
        if let Some(Record::Begin { .. }) = self.records.last() {
            self.pop();
            return;
        }
        self.push(Record::End {
            name: name.to_string(),
        });
    }

    /// Records a committed insertion of `[start, end)`. Returns true if
    /// it coalesced into the preceding insert record, in which case the
    /// caller compensates the modified tick so the merged run still
    /// counts as one undo step.
    ///
    /// Coalescing needs exact adjacency and no newline at the boundary:
    /// the merge point for an append is the last previously inserted
    /// character, for a prepend the last newly inserted one.
    pub fn record_insert(
        &mut self,
        text: &crate::storage::GapBuffer,
        start: usize,
        end: usize,
    ) -> bool {
        debug_assert!(start <= end);
        if start >= end || self.state == UndoState::Disabled {
            return false;
        }

        if let Some(Record::Insert {
            start: last_start,
            end: last_end,
        }) = self.records.last_mut()
        {
            if *last_end == start && text.char_at(start - 1) != Some('\n') {
                *last_end = end;
                return true;
            }
            if *last_start == end && text.char_at(end - 1) != Some('\n') {
                *last_start = start;
                return true;
            }
        }

        self.push(Record::Insert { start, end });
        false
    }

    /// Records a committed deletion of `[start, end)`; `deleted` is the
    /// text captured before the characters vanished. Returns true on
    /// coalescing, as for `record_insert`.
    ///
    /// The backspace pattern extends the previous record leftward, the
    /// delete-key pattern extends it rightward; a deletion that starts or
    /// ends with a newline always opens a fresh record.
    pub fn record_delete(&mut self, start: usize, end: usize, deleted: &str) -> bool {
        debug_assert!(start <= end);
        debug_assert_eq!(deleted.chars().count(), end - start);
        if start >= end || self.state == UndoState::Disabled {
            return false;
        }

        if !deleted.starts_with('\n')
            && !deleted.ends_with('\n')
            && let Some(Record::Delete {
                start: last_start,
                end: last_end,
                text: last_text,
            }) = self.records.last_mut()
        {
            if *last_start == end {
                // [Backspace]: abc| -> ab|
                *last_text = format!("{deleted}{last_text}");
                *last_start = start;
                self.size += deleted.len();
                return true;
            }
            if *last_start == start {
                // [Delete]: a|bc -> a|c
                last_text.push_str(deleted);
                *last_end += end - start;
                self.size += deleted.len();
                return true;
            }
        }

        self.push(Record::Delete {
            start,
            end,
            text: deleted.to_string(),
        });
        false
    }

    /*

    =============================
    ======== TRAVERSAL ==========
    =============================

    */

    /// Undoes up to `count` top-level steps, starting only if `position`
    /// matches the expected pre-undo caret; on a mismatch nothing is
    /// executed and the expected position comes back so the caller can
    /// snap the caret there first. Returns `None` when there is nothing
    /// to undo.
    pub fn undo(
        &mut self,
        buffer: &mut crate::buffer::Buffer,
        mut position: usize,
        count: usize,
    ) -> Option<usize> {
        if !self.can_undo() {
            return None;
        }

        if self.state == UndoState::Redo {
            // Undoing away mid-redo forfeits the un-redone branch.
            self.checkpoint();
        }
        if self.state != UndoState::Undo {
            self.undo_cursor = self.records.len().checked_sub(1);
        }
        self.state = UndoState::Undo;

        let mut remaining = count;
        let mut depth = 0i32;
        loop {
            if depth == 0 {
                if remaining == 0 {
                    break;
                }
                remaining -= 1;
            }

            let Some(index) = self.undo_cursor else {
                debug_assert_eq!(depth, 0, "unbalanced undo group");
                break;
            };

            if remaining == 0 && depth == 0 {
                let expected = self.before_undo(index);
                if position != expected {
                    position = expected;
                    break;
                }
            }

            // Walking tail-ward, an End enters a group, a Begin leaves it.
            match &self.records[index] {
                Record::End { .. } => depth += 1,
                Record::Begin { .. } => depth -= 1,
                _ => {}
            }
            debug_assert!(depth >= 0, "unbalanced undo group");

            match self.records[index].clone() {
                Record::Begin { name } => {
                    // Undoing a group opener closes the mirror group.
                    self.record_end(&name);
                }
                Record::End { name } => {
                    self.record_begin(&name);
                }
                Record::Insert { start, end } => {
                    let doomed = buffer.storage().text(start, end);
                    buffer.internal_delete(start, end);
                    if self.record_delete(start, end, &doomed) {
                        buffer.inc_char_tick(-1);
                    }
                    buffer.inc_char_tick(-1);
                }
                Record::Delete { start, end, text } => {
                    buffer.internal_insert(start, &text);
                    if self.record_insert(buffer.storage(), start, end) {
                        buffer.inc_char_tick(-1);
                    }
                    buffer.inc_char_tick(-1);
                }
            }

            position = self.after_undo(index);
            self.undo_cursor = index.checked_sub(1);
        }

        self.redo_cursor = self.records.len().checked_sub(1);
        Some(position)
    }

    /// Redoes up to `count` top-level steps by re-executing mirror
    /// records tail-ward from the redo cursor, with the same position
    /// handshake as `undo`. Returns `None` when there is nothing to redo.
    pub fn redo(
        &mut self,
        buffer: &mut crate::buffer::Buffer,
        mut position: usize,
        count: usize,
    ) -> Option<usize> {
        if !self.can_redo() {
            return None;
        }

        self.state = UndoState::Redo;

        let mut remaining = count;
        let mut depth = 0i32;
        loop {
            if depth == 0 {
                if remaining == 0 {
                    break;
                }
                remaining -= 1;
            }

            let Some(index) = self.redo_cursor else {
                break;
            };
            if self.undo_cursor == Some(index) {
                // Everything behind this point is already applied.
                break;
            }

            if remaining == 0 && depth == 0 {
                let expected = self.before_redo(index);
                if position != expected {
                    position = expected;
                    break;
                }
            }

            match &self.records[index] {
                Record::End { .. } => depth += 1,
                Record::Begin { .. } => depth -= 1,
                _ => {}
            }
            debug_assert!(depth >= 0, "unbalanced undo group");

            match self.records[index].clone() {
                Record::Begin { .. } | Record::End { .. } => {}
                Record::Insert { start, end } => {
                    // Mirror of an undone deletion: take the span out again.
                    buffer.internal_delete(start, end);
                    buffer.inc_char_tick(1);
                }
                Record::Delete { start, text, .. } => {
                    // Mirror of an undone insertion: put the text back.
                    buffer.internal_insert(start, &text);
                    buffer.inc_char_tick(1);
                }
            }

            position = self.after_redo(index);
            self.redo_cursor = index.checked_sub(1);
            self.undo_cursor = match self.undo_cursor {
                Some(cursor) => Some(cursor + 1),
                None => Some(0),
            };
        }

        Some(position)
    }

    /*

    =============================
    ===== CARET POSITIONS =======
    =============================

    */

    // Group records take their caret positions from the edit records they
    // bracket: an End looks tail-ward at its group's last edit, a Begin
    // head-ward at its first.

    fn before_undo(&self, index: usize) -> usize {
        match &self.records[index] {
            Record::Insert { end, .. } => *end,
            Record::Delete { start, .. } => *start,
            Record::End { .. } => self.before_undo(index - 1),
            Record::Begin { .. } => self.before_undo(index + 1),
        }
    }

    fn after_undo(&self, index: usize) -> usize {
        match &self.records[index] {
            Record::Insert { start, .. } => *start,
            Record::Delete { end, .. } => *end,
            Record::End { .. } => self.after_undo(index - 1),
            Record::Begin { .. } => self.after_undo(index + 1),
        }
    }

    fn before_redo(&self, index: usize) -> usize {
        match &self.records[index] {
            Record::Insert { end, .. } => *end,
            Record::Delete { start, .. } => *start,
            Record::End { .. } => self.before_redo(index - 1),
            Record::Begin { .. } => self.before_redo(index + 1),
        }
    }

    fn after_redo(&self, index: usize) -> usize {
        match &self.records[index] {
            Record::Insert { start, .. } => *start,
            Record::Delete { end, .. } => *end,
            Record::End { .. } => self.after_redo(index - 1),
            Record::Begin { .. } => self.after_redo(index + 1),
        }
    }

    #[cfg(test)]
    fn records(&self) -> &[Record] {
        &self.records
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

fn footprint(record: &Record) -> usize {
    std::mem::size_of::<Record>()
        + match record {
            Record::Begin { name } | Record::End { name } => name.len(),
            Record::Delete { text, .. } => text.len(),
            Record::Insert { .. } => 0,
        }
}

#[cfg(test)]
mod undo_stack_tests {
    use super::*;
    use crate::storage::GapBuffer;

    #[track_caller]
    fn assert_insert_record(record: &Record, expected_start: usize, expected_end: usize) {
        match record {
            Record::Insert { start, end } => {
                assert_eq!(*start, expected_start, "insert start mismatch");
                assert_eq!(*end, expected_end, "insert end mismatch");
            }
            _ => panic!("expected an Insert record, found {record:?}"),
        }
    }

    #[track_caller]
    fn assert_delete_record(
        record: &Record,
        expected_start: usize,
        expected_end: usize,
        expected_text: &str,
    ) {
        match record {
            Record::Delete { start, end, text } => {
                assert_eq!(*start, expected_start, "delete start mismatch");
                assert_eq!(*end, expected_end, "delete end mismatch");
                assert_eq!(text, expected_text, "delete text mismatch");
            }
            _ => panic!("expected a Delete record, found {record:?}"),
        }
    }

    // ==========================================
    // INSERT COALESCING
    // ==========================================

    #[test]
    fn test_adjacent_inserts_coalesce() {
        let mut stack = UndoStack::new();
        let mut text = GapBuffer::new();

        // Typing "a", then "b".
        text.insert(0, "a");
        assert!(!stack.record_insert(&text, 0, 1));
        text.insert(1, "b");
        assert!(stack.record_insert(&text, 1, 2), "should coalesce");

        assert_eq!(stack.records().len(), 1);
        assert_insert_record(&stack.records()[0], 0, 2);
    }

    #[test]
    fn test_insert_coalescing_stops_after_newline() {
        let mut stack = UndoStack::new();
        let mut text = GapBuffer::new();

        text.insert(0, "ab");
        stack.record_insert(&text, 0, 2);
        text.insert(2, "\n");
        assert!(
            stack.record_insert(&text, 2, 3),
            "the newline itself still joins the previous record"
        );
        text.insert(3, "c");
        assert!(
            !stack.record_insert(&text, 3, 4),
            "the first character after a newline opens a fresh record"
        );

        assert_eq!(stack.records().len(), 2);
        assert_insert_record(&stack.records()[0], 0, 3);
        assert_insert_record(&stack.records()[1], 3, 4);
    }

    #[test]
    fn test_prepend_insert_coalesces() {
        let mut stack = UndoStack::new();
        let mut text = GapBuffer::with_text("world");

        text.insert(5, "!");
        stack.record_insert(&text, 5, 6);
        // New span ends where the previous one starts.
        text.insert(3, "xx");
        assert!(stack.record_insert(&text, 3, 5));

        assert_eq!(stack.records().len(), 1);
        assert_insert_record(&stack.records()[0], 3, 6);
    }

    #[test]
    fn test_non_adjacent_inserts_do_not_coalesce() {
        let mut stack = UndoStack::new();
        let mut text = GapBuffer::with_text("0123456789");

        stack.record_insert(&text, 0, 2);
        text.insert(10, "zz");
        assert!(!stack.record_insert(&text, 10, 12));

        assert_eq!(stack.records().len(), 2);
    }

    // ==========================================
    // DELETE COALESCING
    // ==========================================

    #[test]
    fn test_backspace_deletes_coalesce() {
        let mut stack = UndoStack::new();

        // "ab|" -> backspace 'b' -> backspace 'a'.
        assert!(!stack.record_delete(1, 2, "b"));
        assert!(stack.record_delete(0, 1, "a"), "backspace run coalesces");

        assert_eq!(stack.records().len(), 1);
        assert_delete_record(&stack.records()[0], 0, 2, "ab");
    }

    #[test]
    fn test_forward_deletes_coalesce() {
        let mut stack = UndoStack::new();

        // "|ab" -> delete 'a' -> delete 'b' (both land at offset 0).
        assert!(!stack.record_delete(0, 1, "a"));
        assert!(stack.record_delete(0, 1, "b"));

        assert_eq!(stack.records().len(), 1);
        assert_delete_record(&stack.records()[0], 0, 2, "ab");
    }

    #[test]
    fn test_delete_across_newline_starts_fresh_record() {
        let mut stack = UndoStack::new();

        stack.record_delete(1, 2, "b");
        assert!(
            !stack.record_delete(0, 1, "\n"),
            "deleting a newline never coalesces"
        );

        assert_eq!(stack.records().len(), 2);
    }

    // ==========================================
    // GROUPS
    // ==========================================

    #[test]
    fn test_empty_group_is_elided() {
        let mut stack = UndoStack::new();

        stack.record_begin("noop");
        stack.record_end("noop");

        assert!(stack.records().is_empty());
        assert!(!stack.can_undo());
    }

    #[test]
    fn test_star_named_groups_fuse() {
        let mut stack = UndoStack::new();
        let mut text = GapBuffer::new();

        stack.record_begin("*typing");
        text.insert(0, "a");
        stack.record_insert(&text, 0, 1);
        stack.record_end("*typing");

        stack.record_begin("*typing");
        text.insert(1, "b");
        stack.record_insert(&text, 1, 2);
        stack.record_end("*typing");

        // Begin, merged Insert, End: one group, one undo unit.
        assert_eq!(stack.records().len(), 3);
        assert!(matches!(stack.records()[0], Record::Begin { .. }));
        assert_insert_record(&stack.records()[1], 0, 2);
        assert!(matches!(stack.records()[2], Record::End { .. }));
    }

    #[test]
    fn test_plain_named_groups_stay_separate() {
        let mut stack = UndoStack::new();
        let mut text = GapBuffer::new();

        stack.record_begin("test");
        text.insert(0, "foo");
        stack.record_insert(&text, 0, 3);
        stack.record_end("test");

        stack.record_begin("test");
        text.insert(3, "bar");
        stack.record_insert(&text, 3, 6);
        stack.record_end("test");

        // Two complete groups; without the `*` sentinel nothing fuses,
        // and the group boundary keeps the inserts from coalescing.
        assert_eq!(stack.records().len(), 6);
    }

    // ==========================================
    // STATE & BOOKKEEPING
    // ==========================================

    #[test]
    fn test_disabled_suppresses_recording() {
        let mut stack = UndoStack::new();
        let mut text = GapBuffer::new();

        stack.set_enabled(false);
        stack.record_begin("g");
        text.insert(0, "a");
        stack.record_insert(&text, 0, 1);
        stack.record_delete(0, 1, "a");
        stack.record_end("g");

        assert!(stack.records().is_empty());
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());

        stack.set_enabled(true);
        assert_eq!(stack.state(), UndoState::Log);
    }

    #[test]
    fn test_size_tracks_payload_and_clear_zeroes() {
        let mut stack = UndoStack::new();

        assert_eq!(stack.size(), 0);
        stack.record_delete(0, 5, "hello");
        let with_one = stack.size();
        assert!(with_one > 5, "size counts record overhead plus payload");

        stack.record_delete(0, 5, "world");
        assert!(stack.size() > with_one);

        stack.clear();
        assert_eq!(stack.size(), 0);
        assert!(!stack.can_undo());
    }

    #[test]
    fn test_checkpoint_from_log_is_cheap() {
        let mut stack = UndoStack::new();
        let mut text = GapBuffer::new();

        text.insert(0, "x");
        stack.record_insert(&text, 0, 1);
        stack.checkpoint();

        assert_eq!(stack.records().len(), 1, "log state checkpoint keeps the log");
        assert_eq!(stack.state(), UndoState::Log);
    }
}
