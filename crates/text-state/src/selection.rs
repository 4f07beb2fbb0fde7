/// Which end of the selection carries the caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveEnd {
    Start,
    End,
}

/// A selection is a tracked range with an active end: the anchor stays
/// put, the focus is where the caret blinks. The underlying range lives
/// in the buffer's tracker table, so the selection rides along with
/// every edit — including undo/redo replays — without any bookkeeping
/// here.
#[derive(Debug)]
pub struct Selection {
    range: text_core::range::RangeId,
    active: ActiveEnd,
}

impl Selection {
    /// Registers a collapsed selection at `offset`.
    pub fn attach(buffer: &mut text_core::buffer::Buffer, offset: usize) -> Self {
        Self {
            range: buffer.create_range(offset, offset),
            active: ActiveEnd::End,
        }
    }

    /// Deregisters the underlying range. Call this when the view owning
    /// the selection goes away.
    pub fn release(self, buffer: &mut text_core::buffer::Buffer) {
        buffer.remove_range(self.range);
    }

    fn tracked(&self, buffer: &text_core::buffer::Buffer) -> text_core::range::TrackedRange {
        buffer
            .range(self.range)
            .expect("selection range is registered for the buffer's lifetime")
    }

    #[must_use]
    pub fn start(&self, buffer: &text_core::buffer::Buffer) -> usize {
        self.tracked(buffer).start
    }

    #[must_use]
    pub fn end(&self, buffer: &text_core::buffer::Buffer) -> usize {
        self.tracked(buffer).end
    }

    /// The caret position.
    #[must_use]
    pub fn focus(&self, buffer: &text_core::buffer::Buffer) -> usize {
        let range = self.tracked(buffer);
        match self.active {
            ActiveEnd::Start => range.start,
            ActiveEnd::End => range.end,
        }
    }

    /// The fixed end.
    #[must_use]
    pub fn anchor(&self, buffer: &text_core::buffer::Buffer) -> usize {
        let range = self.tracked(buffer);
        match self.active {
            ActiveEnd::Start => range.end,
            ActiveEnd::End => range.start,
        }
    }

    /// True when nothing is selected (the caret case).
    #[must_use]
    pub fn is_caret(&self, buffer: &text_core::buffer::Buffer) -> bool {
        self.tracked(buffer).is_empty()
    }

    /// Selects from `anchor` to `focus`, in either direction.
    pub fn select(&mut self, buffer: &mut text_core::buffer::Buffer, anchor: usize, focus: usize) {
        self.active = if focus < anchor {
            ActiveEnd::Start
        } else {
            ActiveEnd::End
        };
        buffer.set_range(self.range, anchor.min(focus), anchor.max(focus));
    }

    /// Collapses to a caret at `offset`.
    pub fn collapse_to(&mut self, buffer: &mut text_core::buffer::Buffer, offset: usize) {
        self.active = ActiveEnd::End;
        buffer.set_range(self.range, offset, offset);
    }
}
