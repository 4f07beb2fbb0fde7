/// One open document: a buffer plus the selection editing it.
///
/// The edit commands here are the shape the UI and scripting layers
/// call: selection-aware typing, backspace and forward delete, undo and
/// redo routed through the caret. Typing runs inside a `"*typing"` undo
/// group, so a burst of keystrokes — including one that replaced a
/// selection — comes back out as a single undo step.
#[derive(Debug)]
pub struct Document {
    pub buffer: text_core::buffer::Buffer,
    pub selection: crate::selection::Selection,
}

impl Document {
    #[must_use]
    pub fn new(name: &str) -> Self {
        let mut buffer = text_core::buffer::Buffer::new(name);
        let selection = crate::selection::Selection::attach(&mut buffer, 0);
        Self { buffer, selection }
    }

    #[must_use]
    pub fn with_text(name: &str, text: &str) -> Self {
        let mut buffer = text_core::buffer::Buffer::with_text(name, text);
        let selection = crate::selection::Selection::attach(&mut buffer, 0);
        Self { buffer, selection }
    }

    #[inline]
    #[must_use]
    pub fn caret(&self) -> usize {
        self.selection.focus(&self.buffer)
    }

    pub fn select(&mut self, anchor: usize, focus: usize) {
        self.selection.select(&mut self.buffer, anchor, focus);
    }

    /// Types `text` at the selection, replacing it if non-empty.
    pub fn insert_text(&mut self, text: &str) -> text_core::errors::TextResult<()> {
        let start = self.selection.start(&self.buffer);
        let end = self.selection.end(&self.buffer);

        self.buffer.start_undo_group("*typing");
        let mut result = Ok(());
        if start != end {
            result = self.buffer.delete(start, end);
        }
        if result.is_ok() {
            result = self.buffer.insert(start, text);
        }
        self.buffer.end_undo_group("*typing");
        result?;

        let caret = start + text.chars().count();
        self.selection.collapse_to(&mut self.buffer, caret);
        Ok(())
    }

    /// Deletes the selection, or the character behind the caret.
    pub fn backspace(&mut self) -> text_core::errors::TextResult<()> {
        let start = self.selection.start(&self.buffer);
        let end = self.selection.end(&self.buffer);
        if start != end {
            self.buffer.delete(start, end)?;
            self.selection.collapse_to(&mut self.buffer, start);
            return Ok(());
        }
        if start == 0 {
            return Ok(());
        }
        self.buffer.delete(start - 1, start)?;
        self.selection.collapse_to(&mut self.buffer, start - 1);
        Ok(())
    }

    /// Deletes the selection, or the character in front of the caret.
    pub fn delete_forward(&mut self) -> text_core::errors::TextResult<()> {
        let start = self.selection.start(&self.buffer);
        let end = self.selection.end(&self.buffer);
        if start != end {
            self.buffer.delete(start, end)?;
            self.selection.collapse_to(&mut self.buffer, start);
            return Ok(());
        }
        if start == self.buffer.len() {
            return Ok(());
        }
        self.buffer.delete(start, start + 1)?;
        self.selection.collapse_to(&mut self.buffer, start);
        Ok(())
    }

    /// Moves the caret by whole words.
    pub fn move_word(&mut self, count: isize) -> text_core::errors::TextResult<()> {
        let focus = self.selection.focus(&self.buffer);
        let (_, target) = self
            .buffer
            .motion(text_core::motion::Unit::Word, count, focus)?;
        self.selection.collapse_to(&mut self.buffer, target);
        Ok(())
    }

    /// Undoes one step from the caret. When the caret isn't at the undo
    /// point, the first call only snaps it there; the next call consumes
    /// the step. Returns the caret position, or `None` with no history.
    pub fn undo(&mut self) -> Option<usize> {
        let position = self.selection.focus(&self.buffer);
        let result = self.buffer.undo(position);
        if let Some(target) = result {
            self.selection.collapse_to(&mut self.buffer, target);
        }
        result
    }

    /// The forward mirror of [`Document::undo`].
    pub fn redo(&mut self) -> Option<usize> {
        let position = self.selection.focus(&self.buffer);
        let result = self.buffer.redo(position);
        if let Some(target) = result {
            self.selection.collapse_to(&mut self.buffer, target);
        }
        result
    }
}
