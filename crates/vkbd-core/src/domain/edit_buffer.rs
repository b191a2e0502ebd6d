//! Cursor and selection model behind text inputs.
//!
//! Positions are counted in `char`s, not bytes.  A selection is the span
//! between the anchor and the cursor; the anchor is dropped whenever the
//! cursor moves without extending the selection.

/// Editable text with a cursor and an optional selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditBuffer {
    text: String,
    cursor: usize,
    anchor: Option<usize>,
    multi_line: bool,
}

impl EditBuffer {
    /// A buffer that never contains line breaks.
    pub fn single_line() -> Self {
        Self::default()
    }

    /// A buffer made of paragraphs separated by `'\n'`.
    pub fn multi_line() -> Self {
        Self {
            multi_line: true,
            ..Self::default()
        }
    }

    pub fn is_multi_line(&self) -> bool {
        self.multi_line
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor position in chars from the start of the text.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of paragraphs; an empty buffer has one empty paragraph.
    pub fn paragraph_count(&self) -> usize {
        self.text.split('\n').count()
    }

    /// Replaces the whole text and puts the cursor at the end.
    pub fn set_text(&mut self, text: &str) {
        self.text = self.sanitize(text);
        self.cursor = self.char_len();
        self.anchor = None;
    }

    /// Moves the cursor, clamped to the text, and clears the selection.
    pub fn set_cursor(&mut self, position: usize) {
        self.cursor = position.min(self.char_len());
        self.anchor = None;
    }

    pub fn move_left(&mut self) {
        self.set_cursor(self.cursor.saturating_sub(1));
    }

    pub fn move_right(&mut self) {
        self.set_cursor(self.cursor + 1);
    }

    /// Selects `[start, end)`; the cursor ends up at `end`.
    pub fn select(&mut self, start: usize, end: usize) {
        let len = self.char_len();
        self.anchor = Some(start.min(len));
        self.cursor = end.min(len);
    }

    /// Selected span as `(start, end)` with `start < end`.
    pub fn selection(&self) -> Option<(usize, usize)> {
        let anchor = self.anchor?;
        if anchor == self.cursor {
            return None;
        }
        Some((anchor.min(self.cursor), anchor.max(self.cursor)))
    }

    pub fn has_selection(&self) -> bool {
        self.selection().is_some()
    }

    pub fn selected_text(&self) -> Option<&str> {
        let (start, end) = self.selection()?;
        Some(&self.text[self.byte_offset(start)..self.byte_offset(end)])
    }

    /// Inserts `text` at the cursor, replacing the selection if any.
    pub fn insert(&mut self, text: &str) {
        self.remove_selection();
        let text = self.sanitize(text);
        let at = self.byte_offset(self.cursor);
        self.text.insert_str(at, &text);
        self.cursor += text.chars().count();
    }

    /// Removes the selected text and leaves the cursor at the selection start.
    ///
    /// Returns `false` when nothing was selected.
    pub fn remove_selection(&mut self) -> bool {
        let Some((start, end)) = self.selection() else {
            self.anchor = None;
            return false;
        };
        let (from, to) = (self.byte_offset(start), self.byte_offset(end));
        self.text.replace_range(from..to, "");
        self.cursor = start;
        self.anchor = None;
        true
    }

    /// Deletes the character before the cursor.
    ///
    /// Returns `false` at the start of the text.
    pub fn delete_previous_char(&mut self) -> bool {
        self.anchor = None;
        if self.cursor == 0 {
            return false;
        }
        let (from, to) = (self.byte_offset(self.cursor - 1), self.byte_offset(self.cursor));
        self.text.replace_range(from..to, "");
        self.cursor -= 1;
        true
    }

    /// Deletes the selection if there is one, else the previous character.
    pub fn backspace(&mut self) -> bool {
        self.remove_selection() || self.delete_previous_char()
    }

    /// Appends a new paragraph holding `text` at the end of the buffer.
    ///
    /// A cursor sitting at the end follows the text into the new paragraph;
    /// anywhere else it stays put.  Single-line buffers ignore the call.
    pub fn append_paragraph(&mut self, text: &str) -> bool {
        if !self.multi_line {
            return false;
        }
        let was_at_end = self.cursor == self.char_len();
        self.text.push('\n');
        self.text.push_str(&self.sanitize(text));
        if was_at_end {
            self.cursor = self.char_len();
            self.anchor = None;
        }
        true
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(offset, _)| offset)
            .unwrap_or(self.text.len())
    }

    fn sanitize(&self, text: &str) -> String {
        if self.multi_line {
            text.to_string()
        } else {
            text.chars().filter(|c| *c != '\n' && *c != '\r').collect()
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
